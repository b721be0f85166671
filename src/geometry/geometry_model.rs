use serde::{Deserialize, Serialize};

/// A pointer position relative to the top-left corner of the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position in the device's native pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePoint {
    pub x: i32,
    pub y: i32,
}

impl SourcePoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Displayed and natural dimensions of the snapshot image.
///
/// `displayed_*` is the size the image currently occupies on screen (may be
/// zero before layout); `natural_*` is the pixel size of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    pub displayed_width: f64,
    pub displayed_height: f64,
    pub natural_width: f64,
    pub natural_height: f64,
}

impl ImageGeometry {
    pub fn new(displayed_width: f64, displayed_height: f64, natural_width: f64, natural_height: f64) -> Self {
        Self {
            displayed_width,
            displayed_height,
            natural_width,
            natural_height,
        }
    }

    /// True once the image has a non-zero on-screen size.
    pub fn is_laid_out(&self) -> bool {
        self.displayed_width > 0.0 && self.displayed_height > 0.0
    }

    /// Whether a display-space point lies on the image, edges included.
    pub fn contains(&self, point: DisplayPoint) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= self.displayed_width
            && point.y <= self.displayed_height
    }
}

/// Where the image sits inside the container that hosts the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageLayout {
    pub geometry: ImageGeometry,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ImageLayout {
    pub fn new(geometry: ImageGeometry, offset_x: f64, offset_y: f64) -> Self {
        Self {
            geometry,
            offset_x,
            offset_y,
        }
    }

    /// Layout with the image pinned to the container's origin.
    pub fn at_origin(geometry: ImageGeometry) -> Self {
        Self::new(geometry, 0.0, 0.0)
    }
}

/// Rectangle in container (display) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// On-screen size and placement of the image, as reported by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub displayed_width: f64,
    pub displayed_height: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

impl Viewport {
    pub fn new(displayed_width: f64, displayed_height: f64) -> Self {
        Self {
            displayed_width,
            displayed_height,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    /// Combine with the natural image size to get a full layout.
    pub fn layout(&self, natural_width: u32, natural_height: u32) -> ImageLayout {
        let geometry = ImageGeometry::new(
            self.displayed_width,
            self.displayed_height,
            natural_width as f64,
            natural_height as f64,
        );
        ImageLayout::new(geometry, self.offset_x, self.offset_y)
    }
}
