use crate::console::error::ConsoleError;
use crate::geometry::geometry_model::{DisplayPoint, DisplayRect, ImageGeometry, ImageLayout, SourcePoint};
use crate::hierarchy::hierarchy_model::Bounds;

// ============================================================================
// Display -> source
// ============================================================================

/// Scale a display-space point into source pixels without rounding.
///
/// Hover hit-testing works on these fractional coordinates.
pub fn to_source_exact(geometry: &ImageGeometry, point: DisplayPoint) -> Result<(f64, f64), ConsoleError> {
    if !geometry.is_laid_out() {
        return Err(ConsoleError::GeometryUnavailable);
    }

    let scale_x = geometry.natural_width / geometry.displayed_width;
    let scale_y = geometry.natural_height / geometry.displayed_height;

    Ok((point.x * scale_x, point.y * scale_y))
}

/// Forward mapping used when dispatching gestures: scale and round to the
/// nearest device pixel.
pub fn to_source(geometry: &ImageGeometry, point: DisplayPoint) -> Result<SourcePoint, ConsoleError> {
    let (x, y) = to_source_exact(geometry, point)?;
    Ok(SourcePoint::new(x.round() as i32, y.round() as i32))
}

// ============================================================================
// Source -> display
// ============================================================================

/// Inverse mapping: a source pixel position in display space.
pub fn to_display(geometry: &ImageGeometry, point: SourcePoint) -> Result<DisplayPoint, ConsoleError> {
    let (scale_x, scale_y) = inverse_scale(geometry)?;
    Ok(DisplayPoint::new(point.x as f64 * scale_x, point.y as f64 * scale_y))
}

/// Project element bounds into the overlay container, including the image's
/// offset inside that container.
pub fn bounds_to_display(layout: &ImageLayout, bounds: &Bounds) -> Result<DisplayRect, ConsoleError> {
    let (scale_x, scale_y) = inverse_scale(&layout.geometry)?;

    Ok(DisplayRect {
        left: layout.offset_x + bounds.left as f64 * scale_x,
        top: layout.offset_y + bounds.top as f64 * scale_y,
        width: bounds.width() as f64 * scale_x,
        height: bounds.height() as f64 * scale_y,
    })
}

fn inverse_scale(geometry: &ImageGeometry) -> Result<(f64, f64), ConsoleError> {
    // Zero natural size means the image has not decoded yet.
    if !geometry.is_laid_out() || geometry.natural_width <= 0.0 || geometry.natural_height <= 0.0 {
        return Err(ConsoleError::GeometryUnavailable);
    }

    Ok((
        geometry.displayed_width / geometry.natural_width,
        geometry.displayed_height / geometry.natural_height,
    ))
}
