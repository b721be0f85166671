use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::backend::traits::SnapshotProvider;
use crate::console::error::ConsoleError;
use crate::session::frame::{Frame, Snapshot};
use crate::session::state::{RefreshEvent, SessionState};

/// Delays that pace the refresh loop and the post-action sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTiming {
    /// Re-check interval while a gesture is in flight.
    #[serde(default = "default_gesture_poll_ms")]
    pub gesture_poll_ms: u64,

    /// Pause after a failed fetch.
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,

    /// Pause after the post-action refresh before continuous refresh resumes.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Pause between an action's acknowledgement and its one-shot refresh.
    #[serde(default = "default_post_action_delay_ms")]
    pub post_action_delay_ms: u64,

    /// Start continuous refresh when a session begins.
    #[serde(default = "default_true")]
    pub auto_start: bool,
}

impl Default for RefreshTiming {
    fn default() -> Self {
        Self {
            gesture_poll_ms: default_gesture_poll_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            settle_ms: default_settle_ms(),
            post_action_delay_ms: default_post_action_delay_ms(),
            auto_start: true,
        }
    }
}

fn default_gesture_poll_ms() -> u64 { 100 }
fn default_error_backoff_ms() -> u64 { 500 }
fn default_settle_ms() -> u64 { 500 }
fn default_post_action_delay_ms() -> u64 { 200 }
fn default_true() -> bool { true }

// ============================================================================
// Single fetch
// ============================================================================

/// Fetch one snapshot and install it.
///
/// The ticket is taken before the request goes out, so a fetch that was
/// overtaken by a later one is discarded (`Ok(None)`).
pub async fn refresh_once(
    session: &SessionState,
    provider: &dyn SnapshotProvider,
) -> Result<Option<Arc<Frame>>, ConsoleError> {
    fetch_with_ticket(session, provider, session.issue_ticket()).await
}

async fn fetch_with_ticket(
    session: &SessionState,
    provider: &dyn SnapshotProvider,
    ticket: u64,
) -> Result<Option<Arc<Frame>>, ConsoleError> {
    let payload = provider.fetch_snapshot().await?;
    let snapshot = Snapshot::from_payload(payload)?;
    Ok(session.install(ticket, snapshot))
}

// ============================================================================
// Continuous loop
// ============================================================================

/// Run the refresh loop until the session ends or refresh is stopped.
///
/// Returns immediately if another loop already owns the session.
pub async fn run_refresh_loop(
    session: Arc<SessionState>,
    provider: Arc<dyn SnapshotProvider>,
    timing: RefreshTiming,
) {
    if !session.try_start_loop() {
        debug!("refresh loop already running");
        return;
    }
    drive(session, provider, timing).await;
}

// Caller must already hold the loop flag.
async fn drive(session: Arc<SessionState>, provider: Arc<dyn SnapshotProvider>, timing: RefreshTiming) {
    info!("refresh loop started");

    while session.continue_or_finish() {
        let Some(ticket) = session.loop_ticket() else {
            sleep(Duration::from_millis(timing.gesture_poll_ms)).await;
            continue;
        };

        if let Err(e) = fetch_with_ticket(&session, provider.as_ref(), ticket).await {
            warn!(error = %e, backoff_ms = timing.error_backoff_ms, "refresh failed");
            sleep(Duration::from_millis(timing.error_backoff_ms)).await;
        }

        tokio::task::yield_now().await;
    }

    info!("refresh loop stopped");
}

/// Owns the background refresh task for one console.
pub struct RefreshScheduler {
    session: Arc<SessionState>,
    provider: Arc<dyn SnapshotProvider>,
    timing: RefreshTiming,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(session: Arc<SessionState>, provider: Arc<dyn SnapshotProvider>, timing: RefreshTiming) -> Self {
        Self {
            session,
            provider,
            timing,
            handle: Mutex::new(None),
        }
    }

    pub fn timing(&self) -> &RefreshTiming {
        &self.timing
    }

    /// Enable continuous refresh and spawn the loop if none is running.
    ///
    /// Returns whether a new loop task was spawned. Must be called from
    /// inside a tokio runtime.
    pub fn start(&self) -> bool {
        if !self.session.is_active() {
            debug!("refresh not started: no active session");
            return false;
        }

        self.session.apply(RefreshEvent::Tick);
        if !self.session.try_start_loop() {
            return false;
        }

        let task = tokio::spawn(drive(
            Arc::clone(&self.session),
            Arc::clone(&self.provider),
            self.timing,
        ));
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
        true
    }

    /// Cooperative stop: the loop exits at the top of its next cycle and
    /// any fetch already in flight completes normally.
    pub fn stop(&self) {
        self.session.apply(RefreshEvent::StopRequested);
    }

    pub fn is_running(&self) -> bool {
        self.session.flags().refreshing
    }

    /// Wait for the current loop task, if any, to exit.
    pub async fn join(&self) {
        let task = self.handle.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "refresh loop task failed");
            }
        }
    }
}
