use async_trait::async_trait;

use crate::backend::backend_model::{
    ActionAck, DiscardReceipt, HistoryPage, SaveReceipt, SessionInfo, SnapshotPayload,
};
use crate::console::error::ConsoleError;
use crate::gesture::gesture_model::SwipeDirection;

/// Source of device snapshots (image plus hierarchy, captured together).
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<SnapshotPayload, ConsoleError>;
}

/// Injects actions on the device. Each call resolves once the backend has
/// acknowledged the action.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn tap(&self, x: i32, y: i32) -> Result<ActionAck, ConsoleError>;

    async fn swipe(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        direction: SwipeDirection,
    ) -> Result<ActionAck, ConsoleError>;

    async fn input_text(&self, text: &str) -> Result<ActionAck, ConsoleError>;
}

/// Read-only list of actions recorded in the current task.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn list_actions(&self) -> Result<HistoryPage, ConsoleError>;
}

#[async_trait]
pub trait SessionLifecycle: Send + Sync {
    async fn begin_session(&self, info: &SessionInfo) -> Result<(), ConsoleError>;

    /// Persist the current task and close it.
    async fn end_session(&self) -> Result<SaveReceipt, ConsoleError>;

    /// Throw away the current task's data.
    async fn discard_session(&self) -> Result<DiscardReceipt, ConsoleError>;
}

/// Everything the console needs from the device side.
pub trait Backend: SnapshotProvider + ActionExecutor + HistoryProvider + SessionLifecycle {}

impl<T> Backend for T where T: SnapshotProvider + ActionExecutor + HistoryProvider + SessionLifecycle {}
