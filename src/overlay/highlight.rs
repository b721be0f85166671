use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::console::error::ConsoleError;
use crate::geometry::geometry_model::{DisplayRect, ImageLayout};
use crate::geometry::mapper::bounds_to_display;
use crate::hierarchy::hierarchy_model::ElementRecord;

// ============================================================================
// Overlay model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightStyle {
    #[serde(default = "default_border_color")]
    pub border_color: String,

    #[serde(default = "default_fill_color")]
    pub fill_color: String,

    #[serde(default = "default_border_width")]
    pub border_width: u32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            border_color: default_border_color(),
            fill_color: default_fill_color(),
            border_width: default_border_width(),
        }
    }
}

fn default_border_color() -> String { "#ff6b6b".to_string() }
fn default_fill_color() -> String { "rgba(255, 107, 107, 0.1)".to_string() }
fn default_border_width() -> u32 { 2 }

/// The single highlight box, positioned in overlay-container space.
///
/// `pointer_transparent` is always true: the overlay never takes pointer
/// input away from the image underneath it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayBox {
    pub rect: DisplayRect,
    pub style: HighlightStyle,
    pub pointer_transparent: bool,
}

/// Whatever actually paints the overlay (a GUI layer, a terminal, a log).
pub trait OverlaySurface {
    /// Replace whatever is drawn with `overlay`.
    fn draw(&mut self, overlay: &OverlayBox);

    fn clear(&mut self);
}

/// Surface for headless runs: logs instead of painting.
#[derive(Debug, Default)]
pub struct LogSurface;

impl OverlaySurface for LogSurface {
    fn draw(&mut self, overlay: &OverlayBox) {
        debug!(rect = ?overlay.rect, "highlight drawn");
    }

    fn clear(&mut self) {
        debug!("highlight cleared");
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Keeps at most one highlighted element and its drawn box in sync with
/// hover results and container resizes.
pub struct HighlightRenderer<S: OverlaySurface> {
    surface: S,
    style: HighlightStyle,
    highlighted: Option<ElementRecord>,
    drawn: Option<OverlayBox>,
}

impl<S: OverlaySurface> HighlightRenderer<S> {
    pub fn new(surface: S, style: HighlightStyle) -> Self {
        Self {
            surface,
            style,
            highlighted: None,
            drawn: None,
        }
    }

    pub fn highlighted(&self) -> Option<&ElementRecord> {
        self.highlighted.as_ref()
    }

    pub fn drawn(&self) -> Option<&OverlayBox> {
        self.drawn.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Apply a hover result. Redraws only when the element changed.
    pub fn show(&mut self, element: Option<&ElementRecord>, layout: &ImageLayout) -> Result<(), ConsoleError> {
        if element == self.highlighted.as_ref() {
            return Ok(());
        }

        match element {
            Some(element) => {
                self.highlighted = Some(element.clone());
                self.redraw(layout)
            }
            None => {
                self.clear();
                Ok(())
            }
        }
    }

    /// Reposition the current highlight after the container changed size.
    pub fn resize(&mut self, layout: &ImageLayout) -> Result<(), ConsoleError> {
        if self.highlighted.is_none() {
            return Ok(());
        }
        self.redraw(layout)
    }

    pub fn clear(&mut self) {
        self.highlighted = None;
        if self.drawn.take().is_some() {
            self.surface.clear();
        }
    }

    fn redraw(&mut self, layout: &ImageLayout) -> Result<(), ConsoleError> {
        let Some(element) = &self.highlighted else {
            return Ok(());
        };

        let rect = match bounds_to_display(layout, &element.bounds) {
            Ok(rect) => rect,
            Err(e) => {
                self.clear();
                return Err(e);
            }
        };

        let overlay = OverlayBox {
            rect,
            style: self.style.clone(),
            pointer_transparent: true,
        };
        self.surface.draw(&overlay);
        self.drawn = Some(overlay);
        Ok(())
    }
}
