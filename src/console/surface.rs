use std::sync::Arc;

use tracing::debug;

use crate::console::error::ConsoleError;
use crate::geometry::geometry_model::{DisplayPoint, ImageLayout, Viewport};
use crate::geometry::mapper::to_source_exact;
use crate::gesture::classifier::classify;
use crate::gesture::gesture_model::{GestureIntent, GestureThresholds};
use crate::gesture::pointer::{PointerEvent, PointerTracker};
use crate::hierarchy::hierarchy_model::ElementRecord;
use crate::overlay::highlight::{HighlightRenderer, HighlightStyle, OverlaySurface};
use crate::session::frame::Frame;
use crate::session::state::SessionState;

/// Result of the last hover query.
#[derive(Debug, Clone, PartialEq)]
pub enum HoverState {
    /// No query since the last snapshot or pointer exit.
    Unqueried,
    /// Queried; no clickable element under the pointer.
    Nothing,
    Element(ElementRecord),
}

/// The pointer-facing half of the console: turns pointer input into gesture
/// intents and keeps the hover highlight in sync with the current frame.
///
/// Owned by the front-end thread; it only reads shared session state.
pub struct InteractionSurface<S: OverlaySurface> {
    session: Arc<SessionState>,
    thresholds: GestureThresholds,
    tracker: PointerTracker,
    highlight: HighlightRenderer<S>,
    viewport: Option<Viewport>,
    frame: Option<Arc<Frame>>,
    pointer: Option<DisplayPoint>,
    hover: HoverState,
    epoch: u64,
}

impl<S: OverlaySurface> InteractionSurface<S> {
    pub fn new(session: Arc<SessionState>, thresholds: GestureThresholds, surface: S, style: HighlightStyle) -> Self {
        let epoch = session.epoch();
        Self {
            session,
            thresholds,
            tracker: PointerTracker::new(),
            highlight: HighlightRenderer::new(surface, style),
            viewport: None,
            frame: None,
            pointer: None,
            hover: HoverState::Unqueried,
            epoch,
        }
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn highlight(&self) -> &HighlightRenderer<S> {
        &self.highlight
    }

    pub fn pointer(&self) -> Option<DisplayPoint> {
        self.pointer
    }

    pub fn frame(&self) -> Option<&Arc<Frame>> {
        self.frame.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.tracker.is_dragging()
    }

    /// Current image layout; unavailable until both a frame and a non-empty
    /// viewport exist.
    pub fn layout(&self) -> Result<ImageLayout, ConsoleError> {
        let (Some(viewport), Some(frame)) = (self.viewport, self.frame.as_ref()) else {
            return Err(ConsoleError::GeometryUnavailable);
        };
        let layout = viewport.layout(frame.snapshot.image.natural_width, frame.snapshot.image.natural_height);
        if !layout.geometry.is_laid_out() {
            return Err(ConsoleError::GeometryUnavailable);
        }
        Ok(layout)
    }

    // ---- Layout and frames ----

    /// The image was laid out or the container resized.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        if let Ok(layout) = self.layout() {
            let _ = self.highlight.resize(&layout);
        }
    }

    /// Pick up the session's current frame if it changed. A session that
    /// began or ended since the last sync resets pointer and hover first.
    /// Returns whether anything changed.
    pub fn sync_frame(&mut self) -> bool {
        let epoch = self.session.epoch();
        let restarted = epoch != self.epoch;
        if restarted {
            debug!(epoch, "session changed, resetting pointer state");
            self.reset();
            self.epoch = epoch;
        }

        let Some(latest) = self.session.current_frame() else {
            return restarted;
        };
        if self.frame.as_ref().is_some_and(|f| f.seq == latest.seq) {
            return false;
        }
        self.apply_frame(latest);
        true
    }

    /// Swap in a new frame: drop the stale highlight and re-run the hover
    /// query at the last known pointer position.
    pub fn apply_frame(&mut self, frame: Arc<Frame>) {
        self.frame = Some(frame);
        self.highlight.clear();
        self.hover = HoverState::Unqueried;

        if let Some(position) = self.pointer {
            let _ = self.update_hover(position);
        }
    }

    /// Forget everything tied to the previous session.
    pub fn reset(&mut self) {
        self.tracker.cancel();
        self.highlight.clear();
        self.frame = None;
        self.pointer = None;
        self.hover = HoverState::Unqueried;
    }

    // ---- Pointer input ----

    /// Feed one pointer event. Returns a gesture intent when a press/release
    /// cycle completes.
    pub fn handle(&mut self, event: PointerEvent) -> Result<Option<GestureIntent>, ConsoleError> {
        match event {
            PointerEvent::Press { position, at_ms } => {
                let layout = self.layout()?;
                self.tracker
                    .press(&layout.geometry, position, at_ms, self.session.gesture_in_flight())?;
                Ok(None)
            }
            PointerEvent::Move { position, .. } => {
                self.update_hover(position)?;
                Ok(None)
            }
            PointerEvent::Release { position, at_ms } => self.finish_gesture(position, at_ms),
            PointerEvent::Leave { position, at_ms } => {
                self.highlight.clear();
                self.pointer = None;
                self.hover = HoverState::Unqueried;
                self.finish_gesture(position, at_ms)
            }
        }
    }

    fn finish_gesture(&mut self, position: DisplayPoint, at_ms: u64) -> Result<Option<GestureIntent>, ConsoleError> {
        if !self.tracker.is_dragging() {
            return Ok(None);
        }

        let layout = match self.layout() {
            Ok(layout) => layout,
            Err(e) => {
                self.tracker.cancel();
                return Err(e);
            }
        };

        let Some(gesture) = self.tracker.release(&layout.geometry, position, at_ms)? else {
            return Ok(None);
        };

        let intent = classify(&gesture, &self.thresholds);
        debug!(%intent, distance = gesture.distance(), duration_ms = gesture.duration_ms(), "gesture classified");
        Ok(Some(intent))
    }

    /// Hover query for a display-space pointer position.
    pub fn update_hover(&mut self, position: DisplayPoint) -> Result<&HoverState, ConsoleError> {
        self.pointer = Some(position);

        let Some(frame) = self.frame.clone() else {
            return Ok(&self.hover);
        };
        if frame.index.is_empty() {
            self.highlight.clear();
            self.hover = HoverState::Nothing;
            return Ok(&self.hover);
        }

        let layout = self.layout()?;

        if !layout.geometry.contains(position) {
            self.highlight.clear();
            self.hover = HoverState::Nothing;
            return Ok(&self.hover);
        }

        let (x, y) = to_source_exact(&layout.geometry, position)?;
        let hit = frame.index.hit_test(x, y);

        self.highlight.show(hit, &layout)?;
        self.hover = match hit {
            Some(element) => HoverState::Element(element.clone()),
            None => HoverState::Nothing,
        };
        Ok(&self.hover)
    }
}
