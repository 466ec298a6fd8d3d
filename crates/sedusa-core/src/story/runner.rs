//! The control loop: phases, playlists, ticks, and the closing release.

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::acts::{act_timeline, Act};
use super::drivers::{choose_active, drive, DriveCommand, MotionRange};
use super::narrative::{Narrative, OUTRO_KEY};
use super::params::SessionParams;
use super::playlist::build_playlist;
use super::session::SessionShared;
use crate::device::Actuator;
use crate::error::DeviceError;
use crate::motifs::PatternLookup;
use crate::timeline::{compile_by_name, span, Segment, DEFAULT_OVERLAP};

pub const TICK: Duration = Duration::from_millis(60);
/// Quiet time after which the current act speaks again.
pub const REANNOUNCE_AFTER: Duration = Duration::from_secs(18);
pub const RELEASE_HOLD: Duration = Duration::from_secs(10);
const GAZE_HOLD_S: (f64, f64) = (4.0, 6.0);
/// Mixed into the seed to derive the playback stream.
const PLAYBACK_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

fn default_freeze_pattern() -> String {
    "snake_freeze".to_string()
}

fn default_pass_pattern() -> String {
    "snake_pass".to_string()
}

fn default_release_pattern() -> String {
    "wave_train_progressive".to_string()
}

/// Fixed patterns used by the scripted parts of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySettings {
    #[serde(default = "default_freeze_pattern")]
    pub freeze_pattern: String,
    #[serde(default = "default_pass_pattern")]
    pub pass_pattern: String,
    #[serde(default = "default_release_pattern")]
    pub release_pattern: String,
}

impl Default for StorySettings {
    fn default() -> Self {
        Self {
            freeze_pattern: default_freeze_pattern(),
            pass_pattern: default_pass_pattern(),
            release_pattern: default_release_pattern(),
        }
    }
}

/// What one phase was given and what it picked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseLog {
    pub act: Act,
    pub allocated_s: f64,
    pub picks: Vec<String>,
}

/// Record of a finished session, in phase order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoryLog {
    pub phases: Vec<PhaseLog>,
    pub released: bool,
}

pub struct StoryRunner<L: ?Sized, A> {
    lookup: Arc<L>,
    narrative: Arc<Narrative>,
    actuator: Arc<A>,
    shared: Arc<SessionShared>,
    story: StorySettings,
    range: MotionRange,
    length_min: u32,
    selection_rng: Mcg128Xsl64,
    playback_rng: Mcg128Xsl64,
    act: Act,
    last_announce: Instant,
}

impl<L, A> StoryRunner<L, A>
where
    L: PatternLookup + ?Sized,
    A: Actuator,
{
    pub fn new(
        lookup: Arc<L>,
        narrative: Arc<Narrative>,
        actuator: Arc<A>,
        shared: Arc<SessionShared>,
        params: &SessionParams,
        story: StorySettings,
    ) -> Self {
        Self {
            lookup,
            narrative,
            actuator,
            shared,
            story,
            range: params.motion_range(),
            length_min: params.length_min,
            selection_rng: Mcg128Xsl64::seed_from_u64(params.seed),
            playback_rng: Mcg128Xsl64::seed_from_u64(params.seed ^ PLAYBACK_STREAM),
            act: Act::Trap,
            last_announce: Instant::now(),
        }
    }

    /// Run the whole session. Always leaves the shared state stopped.
    pub async fn run(mut self) -> StoryLog {
        info!(seed = self.shared.seed(), length_min = self.length_min, "session started");
        let mut log = StoryLog::default();
        let names = self.lookup.pattern_names();
        self.log_failure("start_motion", self.actuator.start_motion().await);

        for phase in act_timeline(self.length_min) {
            if self.shared.should_stop() {
                break;
            }
            self.enter(phase.act);
            self.announce(&phase.act.opening_key());

            if phase.act == Act::Gaze {
                log.phases.push(PhaseLog {
                    act: phase.act,
                    allocated_s: phase.allocated_s,
                    picks: vec![self.story.freeze_pattern.clone(), self.story.pass_pattern.clone()],
                });
                self.play_gaze().await;
                continue;
            }

            let shared = Arc::clone(&self.shared);
            let playlist = build_playlist(
                self.lookup.as_ref(),
                &names,
                phase.allocated_s,
                &mut self.selection_rng,
                || !shared.should_stop(),
            );
            debug!(act = phase.act.label(), picks = ?playlist.picks, "playlist built");
            log.phases.push(PhaseLog {
                act: phase.act,
                allocated_s: phase.allocated_s,
                picks: playlist.picks.clone(),
            });
            self.play(&playlist.segments, true).await;
        }

        if !self.shared.should_stop() {
            log.released = self.play_release().await;
        } else if !self.shared.stop_requested() {
            // Deadline reached mid-story: leave the device idle.
            self.idle().await;
        }

        self.shared.finish();
        info!(seed = self.shared.seed(), "session finished");
        log
    }

    fn enter(&mut self, act: Act) {
        self.act = act;
        self.shared.set_act(act);
        info!(act = act.label(), "entering act");
    }

    fn announce(&mut self, key: &str) {
        let line = self.narrative.pick(key, &mut self.playback_rng);
        info!(target: "sedusa::narrative", key, "{line}");
        self.shared.set_line(line);
        self.last_announce = Instant::now();
    }

    fn maybe_reannounce(&mut self) {
        if self.last_announce.elapsed() < REANNOUNCE_AFTER {
            return;
        }
        let key = self.act.story_key();
        if self.narrative.has_pool(&key) {
            self.announce(&key);
        }
    }

    /// Tick through `segments` until their span has elapsed.
    async fn play(&mut self, segments: &[Segment], jitter: bool) {
        let total = span(segments);
        if total <= 0.0 {
            return;
        }
        let mut ticker = interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let started = Instant::now();

        loop {
            ticker.tick().await;
            if self.shared.should_stop() {
                break;
            }
            if self.shared.is_paused() {
                continue;
            }
            // A pause anywhere, including during a hold, stopped the device.
            if self.shared.take_motion_halted() {
                self.log_failure("start_motion", self.actuator.start_motion().await);
            }
            self.maybe_reannounce();

            let elapsed = started.elapsed().as_secs_f64();
            if elapsed >= total {
                break;
            }
            match choose_active(segments, elapsed, &mut self.playback_rng) {
                Some(seg) => {
                    let cmd = drive(seg, elapsed - seg.offset_s, jitter, &self.range, &mut self.playback_rng);
                    self.apply(cmd).await;
                }
                None => {
                    let result = self.actuator.set_speed(0.0).await;
                    self.log_failure("set_speed", result);
                }
            }
        }
    }

    async fn apply(&self, cmd: DriveCommand) {
        let result = self.actuator.set_window(cmd.min_mm, cmd.max_mm).await;
        self.log_failure("set_window", result);
        let result = self.actuator.set_speed(cmd.speed_hz).await;
        self.log_failure("set_speed", result);
    }

    /// Sleep in tick-sized steps; returns false once `interrupted` reports
    /// true.
    async fn hold(&self, duration: Duration, interrupted: fn(&SessionShared) -> bool) -> bool {
        let until = Instant::now() + duration;
        loop {
            if interrupted(&self.shared) {
                return false;
            }
            let now = Instant::now();
            if now >= until {
                return true;
            }
            tokio::time::sleep(TICK.min(until - now)).await;
        }
    }

    async fn play_gaze(&mut self) {
        let freeze = compile_by_name(self.lookup.as_ref(), &self.story.freeze_pattern, DEFAULT_OVERLAP);
        self.play(&freeze, true).await;

        let hold_s = self.playback_rng.gen_range(GAZE_HOLD_S.0..=GAZE_HOLD_S.1);
        debug!(hold_s, "gaze hold");
        if !self.hold(Duration::from_secs_f64(hold_s), SessionShared::should_stop).await {
            return;
        }

        let pass = compile_by_name(self.lookup.as_ref(), &self.story.pass_pattern, DEFAULT_OVERLAP);
        self.play(&pass, false).await;
    }

    /// Returns true when the outro was reached.
    async fn play_release(&mut self) -> bool {
        self.enter(Act::Release);
        self.announce(&Act::Release.story_key());

        let release = compile_by_name(self.lookup.as_ref(), &self.story.release_pattern, DEFAULT_OVERLAP);
        self.play(&release, true).await;
        // The closing hold runs past the deadline; only a stop cuts it short.
        if !self.hold(RELEASE_HOLD, SessionShared::stop_requested).await {
            return false;
        }

        let result = self.actuator.stop_motion().await;
        self.log_failure("stop_motion", result);
        self.announce(OUTRO_KEY);
        true
    }

    async fn idle(&self) {
        let result = self.actuator.set_speed(0.0).await;
        self.log_failure("set_speed", result);
        let result = self.actuator.stop_motion().await;
        self.log_failure("stop_motion", result);
    }

    fn log_failure(&self, command: &str, result: Result<(), DeviceError>) {
        if let Err(e) = result {
            warn!(command, "actuator command failed: {e}");
        }
    }
}
