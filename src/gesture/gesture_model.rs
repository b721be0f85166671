use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::geometry_model::SourcePoint;

pub const DEFAULT_TAP_MAX_DISTANCE_PX: f64 = 10.0;
pub const DEFAULT_TAP_MAX_DURATION_MS: u64 = 150;

/// One completed press/release cycle in source-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub start: SourcePoint,
    pub end: SourcePoint,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl GestureEvent {
    /// Widened so extreme coordinates cannot overflow.
    pub fn delta(&self) -> (i64, i64) {
        (
            i64::from(self.end.x) - i64::from(self.start.x),
            i64::from(self.end.y) - i64::from(self.start.y),
        )
    }

    pub fn distance(&self) -> f64 {
        let (dx, dy) = self.delta();
        (dx as f64).hypot(dy as f64)
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Up => "up",
            SwipeDirection::Down => "down",
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a gesture means, ready to be handed to the action executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GestureIntent {
    Tap {
        x: i32,
        y: i32,
    },
    Swipe {
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        direction: SwipeDirection,
    },
}

impl fmt::Display for GestureIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureIntent::Tap { x, y } => write!(f, "tap ({}, {})", x, y),
            GestureIntent::Swipe {
                start_x,
                start_y,
                end_x,
                end_y,
                direction,
            } => write!(
                f,
                "swipe ({}, {}) -> ({}, {}) [{}]",
                start_x, start_y, end_x, end_y, direction
            ),
        }
    }
}

/// Tap/swipe cut-offs. A gesture shorter than either threshold is a tap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureThresholds {
    #[serde(default = "default_tap_distance")]
    pub tap_max_distance_px: f64,

    #[serde(default = "default_tap_duration")]
    pub tap_max_duration_ms: u64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            tap_max_distance_px: DEFAULT_TAP_MAX_DISTANCE_PX,
            tap_max_duration_ms: DEFAULT_TAP_MAX_DURATION_MS,
        }
    }
}

fn default_tap_distance() -> f64 { DEFAULT_TAP_MAX_DISTANCE_PX }
fn default_tap_duration() -> u64 { DEFAULT_TAP_MAX_DURATION_MS }
