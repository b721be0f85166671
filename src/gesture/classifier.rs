use crate::gesture::gesture_model::{GestureEvent, GestureIntent, GestureThresholds, SwipeDirection};

/// Classify a completed press/release cycle.
///
/// Short or brief gestures are taps at the *start* point, so finger drift
/// before release does not move the tap. Everything else is a swipe along
/// the dominant axis; a tie counts as vertical.
pub fn classify(event: &GestureEvent, thresholds: &GestureThresholds) -> GestureIntent {
    let distance = event.distance();
    let duration = event.duration_ms();

    if distance < thresholds.tap_max_distance_px || duration < thresholds.tap_max_duration_ms {
        return GestureIntent::Tap {
            x: event.start.x,
            y: event.start.y,
        };
    }

    let (dx, dy) = event.delta();

    GestureIntent::Swipe {
        start_x: event.start.x,
        start_y: event.start.y,
        end_x: event.end.x,
        end_y: event.end.y,
        direction: swipe_direction(dx, dy),
    }
}

pub fn swipe_direction(dx: i64, dy: i64) -> SwipeDirection {
    if dx.abs() > dy.abs() {
        if dx > 0 { SwipeDirection::Right } else { SwipeDirection::Left }
    } else if dy > 0 {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    }
}
