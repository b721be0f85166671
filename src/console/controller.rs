use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::backend::backend_model::{ActionAck, DiscardReceipt, HistoryPage, SaveReceipt, SessionInfo};
use crate::backend::traits::{Backend, SnapshotProvider};
use crate::console::error::ConsoleError;
use crate::gesture::gesture_model::GestureIntent;
use crate::refresh::scheduler::{RefreshScheduler, RefreshTiming, refresh_once};
use crate::session::frame::Frame;
use crate::session::state::{RefreshPhase, SessionState};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

/// Operator-facing orchestration: session lifecycle, action dispatch and
/// the refresh scheduler, all over one shared `SessionState`.
///
/// Methods take `&self`; wrap the console in an `Arc` to drive it from
/// several tasks.
pub struct Console<B: Backend + 'static> {
    backend: Arc<B>,
    session: Arc<SessionState>,
    scheduler: RefreshScheduler,
    timing: RefreshTiming,
    trace: TraceLogger,
    current_task: Mutex<Option<SessionInfo>>,
}

impl<B: Backend + 'static> Console<B> {
    pub fn new(backend: Arc<B>, timing: RefreshTiming, trace: TraceLogger) -> Self {
        let session = Arc::new(SessionState::new());
        let provider: Arc<dyn SnapshotProvider> = backend.clone();
        let scheduler = RefreshScheduler::new(Arc::clone(&session), provider, timing);

        Self {
            backend,
            session,
            scheduler,
            timing,
            trace,
            current_task: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn current_task(&self) -> Option<SessionInfo> {
        self.current_task.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Start collecting for `info`: announce the task, take the first
    /// snapshot and, if configured, start continuous refresh.
    ///
    /// A failed initial snapshot is logged and left to the refresh loop.
    pub async fn begin_session(&self, info: SessionInfo) -> Result<Option<Arc<Frame>>, ConsoleError> {
        validate_task(&info)?;

        self.scheduler.stop();
        self.backend.begin_session(&info).await?;

        info!(app = %info.app_name, task_type = %info.task_type, "collection session started");
        *self.current_task.lock().unwrap_or_else(PoisonError::into_inner) = Some(info);
        self.session.activate();

        let frame = match refresh_once(&self.session, self.backend.as_ref()).await {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "initial snapshot failed");
                None
            }
        };

        if self.timing.auto_start {
            self.scheduler.start();
        }

        Ok(frame)
    }

    /// Stop refreshing, save the task and close the session.
    ///
    /// If saving fails the session stays active (refresh remains stopped)
    /// so the operator can retry.
    pub async fn end_session(&self) -> Result<SaveReceipt, ConsoleError> {
        self.require_active()?;
        self.scheduler.stop();

        let receipt = self.backend.end_session().await?;

        self.session.deactivate();
        *self.current_task.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.scheduler.join().await;

        info!(data_index = receipt.data_index, saved_actions = receipt.saved_actions, "collection session saved");
        Ok(receipt)
    }

    /// Save the current task and immediately start the next one for the
    /// same app and task type.
    pub async fn next_task(&self, description: &str) -> Result<SaveReceipt, ConsoleError> {
        let info = self.follow_up_task(description)?;
        self.scheduler.stop();

        let receipt = self.backend.end_session().await?;
        info!(data_index = receipt.data_index, "task saved, starting next");

        self.begin_session(info).await?;
        Ok(receipt)
    }

    /// Throw away the current task's data and restart with a new description.
    pub async fn discard_task(&self, description: &str) -> Result<DiscardReceipt, ConsoleError> {
        let info = self.follow_up_task(description)?;
        self.scheduler.stop();

        let receipt = self.backend.discard_session().await?;
        info!(data_index = receipt.data_index, "task discarded");

        self.begin_session(info).await?;
        Ok(receipt)
    }

    fn follow_up_task(&self, description: &str) -> Result<SessionInfo, ConsoleError> {
        self.require_active()?;
        let current = self.current_task().ok_or(ConsoleError::NoSession)?;
        let info = SessionInfo {
            description: description.trim().to_string(),
            ..current
        };
        validate_task(&info)?;
        Ok(info)
    }

    fn require_active(&self) -> Result<(), ConsoleError> {
        if self.session.is_active() {
            Ok(())
        } else {
            Err(ConsoleError::NoSession)
        }
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Turn continuous refresh on or off. Returns the new setting.
    pub fn set_auto_refresh(&self, enabled: bool) -> Result<bool, ConsoleError> {
        self.require_active()?;
        if enabled {
            self.scheduler.start();
        } else {
            self.scheduler.stop();
        }
        Ok(enabled)
    }

    pub fn toggle_auto_refresh(&self) -> Result<bool, ConsoleError> {
        let enabled = matches!(self.session.phase(), RefreshPhase::Refreshing);
        self.set_auto_refresh(!enabled)
    }

    /// Operator-requested snapshot. Refused with `Busy` while a gesture is
    /// in flight so it cannot race the post-action refresh.
    pub async fn refresh_now(&self) -> Result<Option<Arc<Frame>>, ConsoleError> {
        if self.session.gesture_in_flight() {
            return Err(ConsoleError::Busy);
        }
        refresh_once(&self.session, self.backend.as_ref()).await
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Send a classified gesture to the device.
    ///
    /// Resolves after the full round trip: acknowledgement, post-action
    /// refresh and settle delay. New gestures are refused with `Busy` until
    /// then.
    pub async fn dispatch(&self, intent: GestureIntent) -> Result<ActionAck, ConsoleError> {
        self.session.begin_gesture()?;
        info!(%intent, "dispatching gesture");

        let result = match intent {
            GestureIntent::Tap { x, y } => self.backend.tap(x, y).await,
            GestureIntent::Swipe {
                start_x,
                start_y,
                end_x,
                end_y,
                direction,
            } => self.backend.swipe(start_x, start_y, end_x, end_y, direction).await,
        };

        self.trace.log(&TraceEvent::for_intent(&intent).with_result(&result));
        self.after_action(result).await
    }

    /// Type text into the focused field on the device.
    pub async fn input_text(&self, text: &str) -> Result<ActionAck, ConsoleError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ConsoleError::InvalidInput("text is empty".into()));
        }
        self.require_active()?;
        self.session.begin_gesture()?;
        info!(chars = text.chars().count(), "sending text input");

        let result = self.backend.input_text(text).await;

        self.trace.log(&TraceEvent::now("input").with_text(text).with_result(&result));
        self.after_action(result).await
    }

    /// Post-action sequence shared by every action. The gesture slot stays
    /// taken until it completes.
    async fn after_action(&self, result: Result<ActionAck, ConsoleError>) -> Result<ActionAck, ConsoleError> {
        let ack = match result {
            Ok(ack) => ack,
            Err(e) => {
                warn!(error = %e, "action failed");
                self.settle();
                return Err(e);
            }
        };

        sleep(Duration::from_millis(self.timing.post_action_delay_ms)).await;
        if let Err(e) = refresh_once(&self.session, self.backend.as_ref()).await {
            warn!(error = %e, "post-action refresh failed");
        }

        if matches!(self.session.phase(), RefreshPhase::GestureInFlight { resume: true }) {
            sleep(Duration::from_millis(self.timing.settle_ms)).await;
        }

        self.settle();
        Ok(ack)
    }

    fn settle(&self) {
        self.session.settle_gesture();
        // The loop normally keeps polling through a gesture; restart it if
        // it exited in the meantime.
        if matches!(self.session.phase(), RefreshPhase::Refreshing) && !self.scheduler.is_running() {
            self.scheduler.start();
        }
    }

    // ========================================================================
    // History
    // ========================================================================

    pub async fn history(&self) -> Result<HistoryPage, ConsoleError> {
        self.backend.list_actions().await
    }
}

fn validate_task(info: &SessionInfo) -> Result<(), ConsoleError> {
    if info.app_name.trim().is_empty() {
        return Err(ConsoleError::InvalidInput("app name is required".into()));
    }
    if info.task_type.trim().is_empty() {
        return Err(ConsoleError::InvalidInput("task type is required".into()));
    }
    if info.description.trim().is_empty() {
        return Err(ConsoleError::InvalidInput("task description is required".into()));
    }
    Ok(())
}
