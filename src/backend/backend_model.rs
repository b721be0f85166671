use serde::{Deserialize, Serialize};

use crate::gesture::gesture_model::SwipeDirection;

// ============================================================================
// Snapshot
// ============================================================================

/// Body of `GET /screenshot`.
///
/// `image_data` is a `data:image/...;base64,` URL; `hierarchy` is the raw
/// XML dump captured together with the image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub hierarchy: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

// ============================================================================
// Actions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapRequest {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeRequest {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub direction: SwipeDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRequest {
    pub text: String,
}

/// Acknowledgement returned by `/click`, `/swipe` and `/input`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionAck {
    #[serde(default)]
    pub action_count: u64,
    #[serde(default)]
    pub message: Option<String>,
    /// Bounds of the element under a click, `[left, top, right, bottom]`.
    #[serde(default)]
    pub clicked_bounds: Option<Vec<i64>>,
}

// ============================================================================
// History
// ============================================================================

/// One recorded action, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionRecord {
    Click {
        position_x: i32,
        position_y: i32,
        #[serde(default)]
        bounds: Option<Vec<i64>>,
    },
    Swipe {
        press_position_x: i32,
        press_position_y: i32,
        release_position_x: i32,
        release_position_y: i32,
        direction: SwipeDirection,
    },
    Input {
        text: String,
    },
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub action: ActionRecord,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Body of `GET /action_history`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub total_actions: usize,
    #[serde(default)]
    pub actions: Vec<HistoryEntry>,
}

// ============================================================================
// Session lifecycle
// ============================================================================

/// Metadata sent when a collection session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub app_name: String,
    pub task_type: String,
    pub description: String,
}

/// Body of `POST /save_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    #[serde(default)]
    pub data_index: u64,
    #[serde(default)]
    pub saved_actions: u64,
}

/// Body of `POST /delete_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardReceipt {
    #[serde(default)]
    pub data_index: u64,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}
