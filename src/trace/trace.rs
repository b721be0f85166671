use chrono::Utc;
use serde::Serialize;

use crate::backend::backend_model::ActionAck;
use crate::console::error::ConsoleError;
use crate::gesture::gesture_model::GestureIntent;

/// One line of the JSONL action trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: i64,
    pub action: String,

    pub intent: Option<GestureIntent>,
    pub text: Option<String>,

    pub outcome: Option<String>,
    pub action_count: Option<u64>,
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn now(action: impl ToString) -> Self {
        Self {
            timestamp_ms: Utc::now().timestamp_millis(),
            action: action.to_string(),
            intent: None,
            text: None,
            outcome: None,
            action_count: None,
            error: None,
        }
    }

    pub fn for_intent(intent: &GestureIntent) -> Self {
        let kind = match intent {
            GestureIntent::Tap { .. } => "tap",
            GestureIntent::Swipe { .. } => "swipe",
        };
        let mut event = Self::now(kind);
        event.intent = Some(*intent);
        event
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_ack(mut self, ack: &ActionAck) -> Self {
        self.outcome = Some("ok".into());
        self.action_count = Some(ack.action_count);
        self
    }

    pub fn with_error(mut self, error: &ConsoleError) -> Self {
        self.outcome = Some("error".into());
        self.error = Some(error.to_string());
        self
    }

    /// Fill in the outcome from an action result.
    pub fn with_result(self, result: &Result<ActionAck, ConsoleError>) -> Self {
        match result {
            Ok(ack) => self.with_ack(ack),
            Err(e) => self.with_error(e),
        }
    }
}
