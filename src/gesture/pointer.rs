use serde::{Deserialize, Serialize};

use crate::console::error::ConsoleError;
use crate::geometry::geometry_model::{DisplayPoint, ImageGeometry, SourcePoint};
use crate::geometry::mapper::to_source;
use crate::gesture::gesture_model::GestureEvent;

/// Device-independent pointer input in display space.
///
/// Mouse and touch front-ends both translate into this sequence:
/// one `Press`, any number of `Move`s, then `Release` (or `Leave` when the
/// pointer exits the image mid-drag).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum PointerEvent {
    Press { position: DisplayPoint, at_ms: u64 },
    Move { position: DisplayPoint, at_ms: u64 },
    Release { position: DisplayPoint, at_ms: u64 },
    Leave { position: DisplayPoint, at_ms: u64 },
}

impl PointerEvent {
    pub fn position(&self) -> DisplayPoint {
        match self {
            PointerEvent::Press { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Release { position, .. }
            | PointerEvent::Leave { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragStart {
    start: SourcePoint,
    start_ms: u64,
}

/// Turns a press/release pair into a `GestureEvent`.
#[derive(Debug, Default)]
pub struct PointerTracker {
    drag: Option<DragStart>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Begin a drag. Rejected with `Busy` while a prior gesture is still
    /// being dispatched, and with `GeometryUnavailable` before layout.
    pub fn press(
        &mut self,
        geometry: &ImageGeometry,
        position: DisplayPoint,
        at_ms: u64,
        gesture_in_flight: bool,
    ) -> Result<(), ConsoleError> {
        if gesture_in_flight {
            return Err(ConsoleError::Busy);
        }

        let start = to_source(geometry, position)?;
        self.drag = Some(DragStart { start, start_ms: at_ms });
        Ok(())
    }

    /// Complete the drag, if one is in progress.
    pub fn release(
        &mut self,
        geometry: &ImageGeometry,
        position: DisplayPoint,
        at_ms: u64,
    ) -> Result<Option<GestureEvent>, ConsoleError> {
        let Some(drag) = self.drag.take() else {
            return Ok(None);
        };

        let end = to_source(geometry, position)?;

        Ok(Some(GestureEvent {
            start: drag.start,
            end,
            start_ms: drag.start_ms,
            end_ms: at_ms,
        }))
    }

    /// Drop any half-finished drag without producing a gesture.
    pub fn cancel(&mut self) {
        self.drag = None;
    }
}
