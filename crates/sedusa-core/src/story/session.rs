//! State shared between a running session and its callers.
//!
//! Callers only flip the stop/pause flags and read snapshots. The control
//! loop is the sole writer of the live status (current act, last line).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};

use super::acts::Act;
use super::params::SessionParams;
use crate::device::Actuator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Running,
    Paused,
    Stopped,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub state: Lifecycle,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub t_remaining_ms: u64,
    pub last_line: Option<String>,
    pub act: Option<String>,
    pub seed: u64,
}

#[derive(Debug, Default)]
struct LiveStatus {
    act: Option<Act>,
    last_line: Option<String>,
}

#[derive(Debug)]
pub struct SessionShared {
    stop: AtomicBool,
    pause: AtomicBool,
    /// Set when a pause sent `stop_motion`; cleared when motion restarts.
    motion_halted: AtomicBool,
    live: Mutex<LiveStatus>,
    started_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    deadline: Instant,
    seed: u64,
    name: String,
}

impl SessionShared {
    /// Fix the session clock. The deadline never moves afterwards.
    pub fn new(params: &SessionParams) -> Self {
        let length = Duration::from_secs(u64::from(params.length_min) * 60);
        let started_at = Utc::now();
        Self {
            stop: AtomicBool::new(false),
            pause: AtomicBool::new(false),
            motion_halted: AtomicBool::new(false),
            live: Mutex::new(LiveStatus::default()),
            started_at,
            ends_at: started_at + chrono::Duration::minutes(i64::from(params.length_min)),
            deadline: Instant::now() + length,
            seed: params.seed,
            name: params.name.clone(),
        }
    }

    fn live(&self) -> MutexGuard<'_, LiveStatus> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn past_deadline(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Stop was requested or the deadline has passed.
    pub fn should_stop(&self) -> bool {
        self.stop_requested() || self.past_deadline()
    }

    pub fn is_paused(&self) -> bool {
        self.pause.load(Ordering::SeqCst)
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.stop_requested() {
            Lifecycle::Stopped
        } else if self.is_paused() {
            Lifecycle::Paused
        } else {
            Lifecycle::Running
        }
    }

    pub fn set_act(&self, act: Act) {
        self.live().act = Some(act);
    }

    pub fn set_line(&self, line: String) {
        self.live().last_line = Some(line);
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.pause.store(paused, Ordering::SeqCst);
    }

    /// Whether motion must be restarted before the next command, clearing
    /// the mark.
    pub(crate) fn take_motion_halted(&self) -> bool {
        self.motion_halted.swap(false, Ordering::SeqCst)
    }

    /// Mark the session terminal once the control loop has exited.
    pub fn finish(&self) {
        self.request_stop();
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        let live = self.live();
        StatusSnapshot {
            state: self.lifecycle(),
            name: self.name.clone(),
            started_at: self.started_at,
            ends_at: self.ends_at,
            t_remaining_ms: remaining.as_millis() as u64,
            last_line: live.last_line.clone(),
            act: live.act.map(|act| act.label().to_string()),
            seed: self.seed,
        }
    }
}

/// Handle for steering a running session from outside the control loop.
pub struct SessionControl<A> {
    shared: Arc<SessionShared>,
    actuator: Arc<A>,
}

impl<A> Clone for SessionControl<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            actuator: Arc::clone(&self.actuator),
        }
    }
}

impl<A: Actuator> SessionControl<A> {
    pub fn new(shared: Arc<SessionShared>, actuator: Arc<A>) -> Self {
        Self { shared, actuator }
    }

    pub fn shared(&self) -> &Arc<SessionShared> {
        &self.shared
    }

    /// Suspend command issuance. A stopped session stays stopped.
    pub async fn pause(&self) {
        if self.shared.stop_requested() {
            return;
        }
        self.shared.set_paused(true);
        self.shared.motion_halted.store(true, Ordering::SeqCst);
        info!(seed = self.shared.seed, "session paused");
        if let Err(e) = self.actuator.stop_motion().await {
            warn!("stop_motion failed while pausing: {e}");
        }
    }

    pub fn resume(&self) {
        if self.shared.stop_requested() {
            return;
        }
        self.shared.set_paused(false);
        info!(seed = self.shared.seed, "session resumed");
    }

    /// Request termination and idle the device. Safe to call repeatedly.
    pub async fn stop(&self) {
        let already = self.shared.stop.swap(true, Ordering::SeqCst);
        if !already {
            info!(seed = self.shared.seed, "session stop requested");
        }
        if let Err(e) = self.actuator.set_speed(0.0).await {
            warn!("set_speed(0) failed while stopping: {e}");
        }
        if let Err(e) = self.actuator.stop_motion().await {
            warn!("stop_motion failed while stopping: {e}");
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.shared.snapshot()
    }
}
