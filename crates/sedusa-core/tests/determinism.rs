mod common;

use std::sync::Arc;

use common::{library, narrative, request, RecordingActuator};
use sedusa_core::story::{SessionShared, StoryRunner};
use sedusa_core::{Caps, StoryLog, StorySettings};

async fn run_once(seed: u64) -> StoryLog {
    let params = request(10, seed).validate(&Caps::default()).unwrap();
    let shared = Arc::new(SessionShared::new(&params));
    let runner = StoryRunner::new(
        Arc::new(library()),
        Arc::new(narrative()),
        RecordingActuator::new(),
        shared,
        &params,
        StorySettings::default(),
    );
    runner.run().await
}

#[tokio::test(start_paused = true)]
async fn same_seed_replays_picks_and_durations() {
    let a = run_once(424_242).await;
    let b = run_once(424_242).await;
    assert!(!a.phases.is_empty());
    assert_eq!(a, b);
}

#[tokio::test(start_paused = true)]
async fn different_seeds_diverge() {
    let a = run_once(1_001).await;
    let b = run_once(9_009).await;
    let picks = |log: &StoryLog| log.phases.iter().flat_map(|p| p.picks.clone()).collect::<Vec<_>>();
    assert_ne!(picks(&a), picks(&b));
}

#[tokio::test(start_paused = true)]
async fn playlists_alternate_between_contrasting_patterns() {
    let log = run_once(77).await;
    for phase in log.phases.iter().filter(|p| p.picks.len() > 1) {
        for pair in phase.picks.windows(2) {
            assert_ne!(pair[0], pair[1], "repeat in {:?}", phase.act);
        }
    }
}
