//! Session control surface: at most one live session per manager.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::narrative::Narrative;
use super::params::{Caps, SessionRequest};
use super::runner::{StoryLog, StoryRunner, StorySettings};
use super::session::{SessionControl, SessionShared, StatusSnapshot};
use crate::device::Actuator;
use crate::error::Result;
use crate::motifs::PatternLookup;

struct ActiveSession<A> {
    control: SessionControl<A>,
    task: Option<JoinHandle<StoryLog>>,
}

pub struct SessionManager<L: ?Sized, A> {
    lookup: Arc<L>,
    narrative: Arc<Narrative>,
    caps: Caps,
    story: StorySettings,
    /// Serializes start/stop so only one control loop ever runs.
    swap: tokio::sync::Mutex<()>,
    current: Mutex<Option<ActiveSession<A>>>,
}

impl<L, A> SessionManager<L, A>
where
    L: PatternLookup + ?Sized + 'static,
    A: Actuator,
{
    pub fn new(lookup: Arc<L>, narrative: Arc<Narrative>, caps: Caps, story: StorySettings) -> Self {
        Self {
            lookup,
            narrative,
            caps,
            story,
            swap: tokio::sync::Mutex::new(()),
            current: Mutex::new(None),
        }
    }

    fn current(&self) -> MutexGuard<'_, Option<ActiveSession<A>>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn control(&self) -> Option<SessionControl<A>> {
        self.current().as_ref().map(|session| session.control.clone())
    }

    fn take_task(&self) -> Option<JoinHandle<StoryLog>> {
        self.current().as_mut().and_then(|session| session.task.take())
    }

    /// Validate `request`, retire any previous session, and start a new one.
    ///
    /// Invalid parameters are rejected before the previous session is touched.
    pub async fn start(&self, request: &SessionRequest, actuator: Arc<A>) -> Result<StatusSnapshot> {
        let params = request.validate(&self.caps)?;
        let _swap = self.swap.lock().await;

        if let Some(previous) = self.control() {
            info!(seed = previous.shared().seed(), "replacing running session");
            previous.stop().await;
            join(self.take_task()).await;
        }

        let shared = Arc::new(SessionShared::new(&params));
        let control = SessionControl::new(Arc::clone(&shared), Arc::clone(&actuator));
        let runner = StoryRunner::new(
            Arc::clone(&self.lookup),
            Arc::clone(&self.narrative),
            actuator,
            shared,
            &params,
            self.story.clone(),
        );
        let task = tokio::spawn(runner.run());
        let snapshot = control.snapshot();

        *self.current() = Some(ActiveSession {
            control,
            task: Some(task),
        });
        Ok(snapshot)
    }

    pub async fn pause(&self) -> Option<StatusSnapshot> {
        let control = self.control()?;
        control.pause().await;
        Some(control.snapshot())
    }

    pub fn resume(&self) -> Option<StatusSnapshot> {
        let control = self.control()?;
        control.resume();
        Some(control.snapshot())
    }

    /// Stop the current session and wait for its loop to exit. The stopped
    /// session stays visible through [`status`](Self::status).
    pub async fn stop(&self) -> Option<StatusSnapshot> {
        let _swap = self.swap.lock().await;
        let control = self.control()?;
        control.stop().await;
        join(self.take_task()).await;
        Some(control.snapshot())
    }

    /// `None` when no session was ever started.
    pub fn status(&self) -> Option<StatusSnapshot> {
        self.control().map(|control| control.snapshot())
    }

    /// Wait for the current session to end on its own (or be stopped).
    pub async fn wait(&self) -> Option<StoryLog> {
        let task = self.take_task()?;
        match task.await {
            Ok(log) => Some(log),
            Err(e) => {
                warn!("session task ended abnormally: {e}");
                None
            }
        }
    }
}

async fn join(task: Option<JoinHandle<StoryLog>>) {
    if let Some(task) = task {
        if let Err(e) = task.await {
            warn!("session task ended abnormally: {e}");
        }
    }
}
