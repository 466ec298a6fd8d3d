mod common;

use std::time::Duration;

use common::{manager, request, script_manager, Command, RecordingActuator};
use sedusa_core::{Act, CoreError, Lifecycle, SessionRequest};
use tokio::time::{sleep, Instant};

#[tokio::test(start_paused = true)]
async fn session_runs_through_release_and_outro() {
    let manager = manager();
    let actuator = RecordingActuator::new();
    let first = manager.start(&request(10, 777), actuator.clone()).await.unwrap();
    assert_eq!(first.state, Lifecycle::Running);
    assert_eq!(first.seed, 777);
    assert_eq!(first.name, "tester");

    let log = manager.wait().await.unwrap();
    let acts: Vec<Act> = log.phases.iter().map(|p| p.act).collect();
    assert_eq!(acts, vec![Act::Trap, Act::Revelation, Act::Test, Act::Gaze]);
    assert!(log.released);

    let status = manager.status().unwrap();
    assert_eq!(status.state, Lifecycle::Stopped);
    assert_eq!(status.act.as_deref(), Some("The Release"));
    assert_eq!(status.last_line.as_deref(), Some("Rest now."));

    let commands = actuator.commands();
    assert_eq!(commands.first(), Some(&Command::Start));
    assert_eq!(commands.last(), Some(&Command::Stop));
    for command in &commands {
        if let Command::Window(lo, hi) = command {
            assert!(*lo >= 20.0 && *hi <= 100.0 && lo <= hi, "window {lo}..{hi}");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn pause_halts_commands_without_moving_deadline() {
    let manager = manager();
    let actuator = RecordingActuator::new();
    let initial = manager.start(&request(10, 11), actuator.clone()).await.unwrap();

    sleep(Duration::from_secs(5)).await;
    let paused = manager.pause().await.unwrap();
    assert_eq!(paused.state, Lifecycle::Paused);
    assert_eq!(paused.ends_at, initial.ends_at);
    assert_eq!(actuator.commands().last(), Some(&Command::Stop));
    let count = actuator.count();

    sleep(Duration::from_secs(3)).await;
    assert_eq!(actuator.count(), count, "commands issued while paused");
    let later = manager.status().unwrap();
    assert_eq!(later.state, Lifecycle::Paused);
    assert_eq!(later.ends_at, initial.ends_at);
    let waited = paused.t_remaining_ms - later.t_remaining_ms;
    assert!((2990..=3010).contains(&waited), "waited {waited}ms");

    let resumed_at = Instant::now();
    let resumed = manager.resume().unwrap();
    assert_eq!(resumed.state, Lifecycle::Running);
    sleep(Duration::from_secs(1)).await;
    let after = actuator.commands_since(resumed_at);
    assert_eq!(after.first(), Some(&Command::Start));
    assert!(after.iter().any(|c| matches!(c, Command::Speed(_))));

    let end = manager.status().unwrap();
    assert_eq!(end.ends_at, initial.ends_at);
    assert!(end.t_remaining_ms < later.t_remaining_ms);

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_terminal() {
    let manager = manager();
    let actuator = RecordingActuator::new();
    manager.start(&request(10, 5), actuator.clone()).await.unwrap();
    sleep(Duration::from_secs(2)).await;

    let first = manager.stop().await.unwrap();
    assert_eq!(first.state, Lifecycle::Stopped);
    let tail: Vec<Command> = actuator.commands().into_iter().rev().take(2).collect();
    assert_eq!(tail, vec![Command::Stop, Command::Speed(0.0)]);

    let second = manager.stop().await.unwrap();
    assert_eq!(second.state, Lifecycle::Stopped);

    assert_eq!(manager.pause().await.unwrap().state, Lifecycle::Stopped);
    assert_eq!(manager.resume().unwrap().state, Lifecycle::Stopped);

    let count = actuator.count();
    sleep(Duration::from_secs(5)).await;
    assert_eq!(actuator.count(), count);
    assert_eq!(manager.status().unwrap().state, Lifecycle::Stopped);
}

#[tokio::test(start_paused = true)]
async fn new_start_replaces_running_session() {
    let manager = manager();
    let old = RecordingActuator::new();
    let new = RecordingActuator::new();

    manager.start(&request(10, 1001), old.clone()).await.unwrap();
    sleep(Duration::from_secs(2)).await;
    let replaced_at = Instant::now();
    let snapshot = manager.start(&request(10, 2002), new.clone()).await.unwrap();
    assert_eq!(snapshot.seed, 2002);
    assert_eq!(snapshot.state, Lifecycle::Running);

    sleep(Duration::from_secs(3)).await;
    let old_after: Vec<Command> = old.commands_since(replaced_at);
    assert_eq!(old_after, vec![Command::Speed(0.0), Command::Stop]);
    assert!(new.count() > 10);
    assert_eq!(manager.status().unwrap().seed, 2002);

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn invalid_request_is_rejected_before_anything_runs() {
    let manager = manager();
    let actuator = RecordingActuator::new();
    let bad = SessionRequest {
        depth_max: f64::INFINITY,
        ..request(10, 1)
    };
    let err = manager.start(&bad, actuator.clone()).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert!(manager.status().is_none());
    assert_eq!(actuator.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn invalid_request_leaves_running_session_alone() {
    let manager = manager();
    let actuator = RecordingActuator::new();
    manager.start(&request(10, 3), actuator.clone()).await.unwrap();
    sleep(Duration::from_secs(1)).await;

    let bad = SessionRequest {
        length_min: 0,
        ..request(10, 4)
    };
    assert!(manager.start(&bad, RecordingActuator::new()).await.is_err());
    let status = manager.status().unwrap();
    assert_eq!(status.state, Lifecycle::Running);
    assert_eq!(status.seed, 3);

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn deadline_ends_session_and_idles_device() {
    let manager = manager();
    let actuator = RecordingActuator::new();
    manager.start(&request(1, 9), actuator.clone()).await.unwrap();

    let log = manager.wait().await.unwrap();
    assert!(!log.released);
    let status = manager.status().unwrap();
    assert_eq!(status.state, Lifecycle::Stopped);
    assert_eq!(status.t_remaining_ms, 0);

    let tail: Vec<Command> = actuator.commands().into_iter().rev().take(2).collect();
    assert_eq!(tail, vec![Command::Stop, Command::Speed(0.0)]);
}

#[tokio::test(start_paused = true)]
async fn actuator_failures_do_not_end_session() {
    let manager = manager();
    let actuator = RecordingActuator::failing();
    manager.start(&request(1, 21), actuator.clone()).await.unwrap();

    sleep(Duration::from_secs(10)).await;
    assert_eq!(manager.status().unwrap().state, Lifecycle::Running);
    assert!(actuator.count() > 100);

    assert_eq!(manager.stop().await.unwrap().state, Lifecycle::Stopped);
}

#[tokio::test(start_paused = true)]
async fn opening_line_is_announced_without_cue() {
    let manager = manager();
    let actuator = RecordingActuator::new();
    manager.start(&request(10, 8), actuator).await.unwrap();
    sleep(Duration::from_millis(200)).await;

    let status = manager.status().unwrap();
    assert_eq!(status.act.as_deref(), Some("The Trap"));
    assert_eq!(status.last_line.as_deref(), Some("Come closer."));

    manager.stop().await;
}

const TICK: Duration = Duration::from_millis(60);

#[tokio::test(start_paused = true)]
async fn quiet_act_speaks_again_after_eighteen_seconds() {
    let manager = manager();
    manager.start(&request(10, 8), RecordingActuator::new()).await.unwrap();

    sleep(Duration::from_secs(17)).await;
    assert_eq!(manager.status().unwrap().last_line.as_deref(), Some("Come closer."));

    sleep(Duration::from_secs(2)).await;
    let status = manager.status().unwrap();
    assert_eq!(status.act.as_deref(), Some("The Trap"));
    assert_eq!(status.last_line.as_deref(), Some("There is no way out."));

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn resume_during_gaze_hold_restarts_motion() {
    // Freeze ends at 3s; the hold then lasts 4-6s.
    let manager = script_manager(3000);
    let actuator = RecordingActuator::new();
    manager.start(&request(10, 31), actuator.clone()).await.unwrap();

    sleep(Duration::from_secs(4)).await;
    assert_eq!(manager.status().unwrap().act.as_deref(), Some("The Gaze"));
    manager.pause().await.unwrap();
    assert_eq!(actuator.commands().last(), Some(&Command::Stop));
    sleep(Duration::from_millis(500)).await;

    let resumed_at = Instant::now();
    manager.resume().unwrap();
    let log = manager.wait().await.unwrap();
    assert!(log.released);

    let after = actuator.commands_since(resumed_at);
    let first_start = after.iter().position(|c| *c == Command::Start);
    let first_motion = after
        .iter()
        .position(|c| matches!(c, Command::Window(..) | Command::Speed(_)));
    assert_eq!(first_start, Some(0), "commands after resume: {after:?}");
    assert!(first_motion.is_some());
}

#[tokio::test(start_paused = true)]
async fn gaze_pass_plays_without_jitter() {
    // The pass starts between 7s and 9s and lasts 3s, so 9.2s..9.9s is inside it.
    let manager = script_manager(3000);
    let actuator = RecordingActuator::new();
    manager.start(&request(10, 47), actuator.clone()).await.unwrap();

    sleep(Duration::from_millis(9200)).await;
    let window_start = Instant::now();
    sleep(Duration::from_millis(700)).await;
    assert_eq!(manager.status().unwrap().act.as_deref(), Some("The Gaze"));

    let during = actuator.commands_since(window_start);
    let speeds: Vec<f64> = during
        .iter()
        .filter_map(|c| match c {
            Command::Speed(hz) => Some(*hz),
            _ => None,
        })
        .collect();
    assert!(speeds.len() >= 10, "too few ticks: {during:?}");
    // 70% of 3 Hz mapped into 0.5..2.5 Hz, untouched by jitter or slips.
    assert!(speeds.iter().all(|hz| (hz - 1.9).abs() < 1e-9), "{speeds:?}");

    let windows: Vec<Command> = during
        .iter()
        .copied()
        .filter(|c| matches!(c, Command::Window(..)))
        .collect();
    assert!(windows.windows(2).all(|pair| pair[0] == pair[1]), "{windows:?}");

    manager.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_during_gaze_hold_lands_within_a_tick() {
    let manager = script_manager(3000);
    let actuator = RecordingActuator::new();
    manager.start(&request(10, 52), actuator.clone()).await.unwrap();
    sleep(Duration::from_secs(5)).await;

    let stop_at = Instant::now();
    let status = manager.stop().await.unwrap();
    assert!(stop_at.elapsed() <= TICK, "stop took {:?}", stop_at.elapsed());
    assert_eq!(status.state, Lifecycle::Stopped);
    assert_eq!(status.act.as_deref(), Some("The Gaze"));
    assert_eq!(actuator.commands_since(stop_at), vec![Command::Speed(0.0), Command::Stop]);
}

#[tokio::test(start_paused = true)]
async fn stop_during_release_hold_skips_outro() {
    // Release playback ends by 17s and its hold lasts 10s.
    let manager = script_manager(3000);
    let actuator = RecordingActuator::new();
    manager.start(&request(10, 63), actuator.clone()).await.unwrap();
    sleep(Duration::from_secs(20)).await;
    assert_eq!(manager.status().unwrap().act.as_deref(), Some("The Release"));

    let stop_at = Instant::now();
    let status = manager.stop().await.unwrap();
    assert!(stop_at.elapsed() <= TICK, "stop took {:?}", stop_at.elapsed());
    assert_eq!(status.state, Lifecycle::Stopped);
    assert_eq!(status.last_line.as_deref(), Some("Let go."));
    assert_eq!(actuator.commands_since(stop_at), vec![Command::Speed(0.0), Command::Stop]);
}

#[tokio::test(start_paused = true)]
async fn deadline_cuts_gaze_hold_short() {
    // Freeze runs to 58s, so the 4-6s hold straddles the one-minute deadline.
    let manager = script_manager(58_000);
    let actuator = RecordingActuator::new();
    let started = Instant::now();
    manager.start(&request(1, 74), actuator.clone()).await.unwrap();

    let log = manager.wait().await.unwrap();
    let elapsed = started.elapsed();
    assert!(!log.released);
    assert!(elapsed >= Duration::from_secs(60));
    assert!(elapsed <= Duration::from_secs(60) + TICK, "ended at {elapsed:?}");

    let status = manager.status().unwrap();
    assert_eq!(status.state, Lifecycle::Stopped);
    let tail: Vec<Command> = actuator.commands().into_iter().rev().take(2).collect();
    assert_eq!(tail, vec![Command::Stop, Command::Speed(0.0)]);
}
