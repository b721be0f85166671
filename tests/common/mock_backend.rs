use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use collect_console::backend::backend_model::{
    ActionAck, ActionRecord, DiscardReceipt, HistoryEntry, HistoryPage, SaveReceipt, SessionInfo,
    SnapshotPayload,
};
use collect_console::backend::traits::{ActionExecutor, HistoryProvider, SessionLifecycle, SnapshotProvider};
use collect_console::console::error::ConsoleError;
use collect_console::gesture::gesture_model::SwipeDirection;

use super::fixtures::nested_payload;

/// In-memory backend that records every call in order.
///
/// Call log entries: `fetch:start`, `fetch:end`, `tap:start`, `tap:ack`,
/// `swipe:start`, `swipe:ack`, `input:start`, `input:ack`, `begin`, `save`,
/// `discard`. Every fetch and action sleeps, so loops driven by it always
/// yield to the (paused) clock.
pub struct MockBackend {
    payload: Mutex<SnapshotPayload>,
    fetch_delay: Duration,
    action_delay: Duration,

    pub fail_fetch: AtomicBool,
    pub fail_actions: AtomicBool,
    pub fail_lifecycle: AtomicBool,

    calls: Mutex<Vec<String>>,
    pub sessions: Mutex<Vec<SessionInfo>>,
    pub history: Mutex<Vec<HistoryEntry>>,
    fetches_in_flight: AtomicUsize,
    max_concurrent_fetches: AtomicUsize,
    action_count: AtomicU64,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            payload: Mutex::new(nested_payload()),
            fetch_delay: Duration::from_millis(50),
            action_delay: Duration::from_millis(50),
            fail_fetch: AtomicBool::new(false),
            fail_actions: AtomicBool::new(false),
            fail_lifecycle: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            sessions: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
            fetches_in_flight: AtomicUsize::new(0),
            max_concurrent_fetches: AtomicUsize::new(0),
            action_count: AtomicU64::new(0),
        }
    }

    pub fn with_fetch_delay(mut self, ms: u64) -> Self {
        self.fetch_delay = Duration::from_millis(ms);
        self
    }

    pub fn with_action_delay(mut self, ms: u64) -> Self {
        self.action_delay = Duration::from_millis(ms);
        self
    }

    pub fn set_payload(&self, payload: SnapshotPayload) {
        *self.payload.lock().unwrap() = payload;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches.load(Ordering::SeqCst)
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    async fn action(&self, name: &str, record: ActionRecord) -> Result<ActionAck, ConsoleError> {
        self.record(&format!("{}:start", name));
        sleep(self.action_delay).await;

        if self.fail_actions.load(Ordering::SeqCst) {
            self.record(&format!("{}:error", name));
            return Err(ConsoleError::fetch(format!("/{}", name), "device offline"));
        }

        self.history.lock().unwrap().push(HistoryEntry {
            action: record,
            timestamp: None,
        });
        let count = self.action_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(&format!("{}:ack", name));
        Ok(ActionAck {
            action_count: count,
            message: None,
            clicked_bounds: None,
        })
    }

    fn lifecycle_error(&self, endpoint: &str) -> Option<ConsoleError> {
        self.fail_lifecycle
            .load(Ordering::SeqCst)
            .then(|| ConsoleError::fetch(endpoint, "storage unavailable"))
    }
}

#[async_trait]
impl SnapshotProvider for MockBackend {
    async fn fetch_snapshot(&self) -> Result<SnapshotPayload, ConsoleError> {
        self.record("fetch:start");
        let now = self.fetches_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_fetches.fetch_max(now, Ordering::SeqCst);

        sleep(self.fetch_delay).await;

        self.fetches_in_flight.fetch_sub(1, Ordering::SeqCst);
        self.record("fetch:end");

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ConsoleError::fetch("/screenshot", "connection refused"));
        }
        Ok(self.payload.lock().unwrap().clone())
    }
}

#[async_trait]
impl ActionExecutor for MockBackend {
    async fn tap(&self, x: i32, y: i32) -> Result<ActionAck, ConsoleError> {
        self.action(
            "tap",
            ActionRecord::Click {
                position_x: x,
                position_y: y,
                bounds: None,
            },
        )
        .await
    }

    async fn swipe(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        direction: SwipeDirection,
    ) -> Result<ActionAck, ConsoleError> {
        self.action(
            "swipe",
            ActionRecord::Swipe {
                press_position_x: start_x,
                press_position_y: start_y,
                release_position_x: end_x,
                release_position_y: end_y,
                direction,
            },
        )
        .await
    }

    async fn input_text(&self, text: &str) -> Result<ActionAck, ConsoleError> {
        self.action("input", ActionRecord::Input { text: text.to_string() }).await
    }
}

#[async_trait]
impl HistoryProvider for MockBackend {
    async fn list_actions(&self) -> Result<HistoryPage, ConsoleError> {
        let actions = self.history.lock().unwrap().clone();
        Ok(HistoryPage {
            total_actions: actions.len(),
            actions,
        })
    }
}

#[async_trait]
impl SessionLifecycle for MockBackend {
    async fn begin_session(&self, info: &SessionInfo) -> Result<(), ConsoleError> {
        if let Some(e) = self.lifecycle_error("/set_task_description") {
            return Err(e);
        }
        self.record("begin");
        self.sessions.lock().unwrap().push(info.clone());
        self.history.lock().unwrap().clear();
        Ok(())
    }

    async fn end_session(&self) -> Result<SaveReceipt, ConsoleError> {
        if let Some(e) = self.lifecycle_error("/save_data") {
            return Err(e);
        }
        self.record("save");
        let saved_actions = self.history.lock().unwrap().len() as u64;
        Ok(SaveReceipt {
            data_index: self.sessions.lock().unwrap().len() as u64,
            saved_actions,
        })
    }

    async fn discard_session(&self) -> Result<DiscardReceipt, ConsoleError> {
        if let Some(e) = self.lifecycle_error("/delete_data") {
            return Err(e);
        }
        self.record("discard");
        self.history.lock().unwrap().clear();
        Ok(DiscardReceipt {
            data_index: self.sessions.lock().unwrap().len() as u64,
        })
    }
}
