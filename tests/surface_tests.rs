use std::sync::Arc;

use collect_console::{
    console::{
        error::ConsoleError,
        surface::{HoverState, InteractionSurface},
    },
    geometry::geometry_model::{DisplayPoint, DisplayRect, ImageGeometry, ImageLayout, Viewport},
    gesture::{
        gesture_model::{GestureIntent, GestureThresholds, SwipeDirection},
        pointer::PointerEvent,
    },
    hierarchy::{hierarchy_model::ElementRecord, index::ElementIndex, parser::parse_hierarchy},
    overlay::highlight::{HighlightRenderer, HighlightStyle, OverlayBox, OverlaySurface},
    session::{frame::Snapshot, state::SessionState},
};

use crate::common::fixtures::{NESTED_HEIGHT, NESTED_WIDTH, NESTED_XML, install_nested, payload};

mod common;

/// Records every draw and clear instead of painting.
#[derive(Debug, Default)]
struct RecordingSurface {
    draws: Vec<OverlayBox>,
    clears: usize,
}

impl OverlaySurface for RecordingSurface {
    fn draw(&mut self, overlay: &OverlayBox) {
        self.draws.push(overlay.clone());
    }

    fn clear(&mut self) {
        self.clears += 1;
    }
}

fn element(text: &str) -> ElementRecord {
    let index = ElementIndex::build(&parse_hierarchy(NESTED_XML).unwrap());
    index
        .elements()
        .iter()
        .find(|e| e.text.as_deref() == Some(text))
        .cloned()
        .unwrap()
}

/// 200x400 source shown at 100x200 (half scale), offset (10, 20).
fn half_layout() -> ImageLayout {
    ImageLayout::new(ImageGeometry::new(100.0, 200.0, 200.0, 400.0), 10.0, 20.0)
}

// =========================================================================
// Highlight renderer
// =========================================================================

#[test]
fn highlight_draws_inverse_mapped_box() {
    let mut renderer = HighlightRenderer::new(RecordingSurface::default(), HighlightStyle::default());
    let inner = element("Inner");

    renderer.show(Some(&inner), &half_layout()).unwrap();

    let drawn = renderer.drawn().unwrap();
    assert_eq!(
        drawn.rect,
        DisplayRect {
            left: 15.0,
            top: 25.0,
            width: 5.0,
            height: 5.0
        }
    );
    assert!(drawn.pointer_transparent);
    assert_eq!(drawn.style.border_color, "#ff6b6b");
    assert_eq!(renderer.highlighted(), Some(&inner));
}

#[test]
fn same_element_is_not_redrawn() {
    let mut renderer = HighlightRenderer::new(RecordingSurface::default(), HighlightStyle::default());
    let inner = element("Inner");

    renderer.show(Some(&inner), &half_layout()).unwrap();
    renderer.show(Some(&inner), &half_layout()).unwrap();
    assert_eq!(renderer.surface().draws.len(), 1);

    renderer.show(Some(&element("Outer")), &half_layout()).unwrap();
    assert_eq!(renderer.surface().draws.len(), 2);
    assert_eq!(renderer.drawn().unwrap().rect.width, 50.0);
}

#[test]
fn none_clears_the_highlight() {
    let mut renderer = HighlightRenderer::new(RecordingSurface::default(), HighlightStyle::default());
    renderer.show(Some(&element("Inner")), &half_layout()).unwrap();

    renderer.show(None, &half_layout()).unwrap();
    assert!(renderer.drawn().is_none());
    assert!(renderer.highlighted().is_none());
    assert_eq!(renderer.surface().clears, 1);

    // Clearing an empty overlay does not touch the surface
    renderer.clear();
    assert_eq!(renderer.surface().clears, 1);
}

#[test]
fn resize_repositions_last_highlight() {
    let mut renderer = HighlightRenderer::new(RecordingSurface::default(), HighlightStyle::default());
    renderer.show(Some(&element("Inner")), &half_layout()).unwrap();

    let full = ImageLayout::at_origin(ImageGeometry::new(200.0, 400.0, 200.0, 400.0));
    renderer.resize(&full).unwrap();

    let rect = renderer.drawn().unwrap().rect;
    assert_eq!((rect.left, rect.top, rect.width, rect.height), (10.0, 10.0, 10.0, 10.0));
    assert_eq!(renderer.surface().draws.len(), 2);
}

#[test]
fn resize_without_highlight_draws_nothing() {
    let mut renderer = HighlightRenderer::new(RecordingSurface::default(), HighlightStyle::default());
    renderer.resize(&half_layout()).unwrap();
    assert!(renderer.surface().draws.is_empty());
}

#[test]
fn unavailable_geometry_clears_instead_of_drawing() {
    let mut renderer = HighlightRenderer::new(RecordingSurface::default(), HighlightStyle::default());
    renderer.show(Some(&element("Inner")), &half_layout()).unwrap();

    let collapsed = ImageLayout::at_origin(ImageGeometry::new(0.0, 0.0, 200.0, 400.0));
    assert_eq!(renderer.resize(&collapsed), Err(ConsoleError::GeometryUnavailable));
    assert!(renderer.drawn().is_none());
}

#[test]
fn custom_style_is_carried_onto_the_box() {
    let style = HighlightStyle {
        border_color: "#00ff00".into(),
        fill_color: "transparent".into(),
        border_width: 4,
    };
    let mut renderer = HighlightRenderer::new(RecordingSurface::default(), style.clone());
    renderer.show(Some(&element("Outer")), &half_layout()).unwrap();
    assert_eq!(renderer.drawn().unwrap().style, style);
}

// =========================================================================
// Interaction surface
// =========================================================================

fn surface_with_frame() -> (Arc<SessionState>, InteractionSurface<RecordingSurface>) {
    let session = Arc::new(SessionState::new());
    install_nested(&session);

    let mut surface = InteractionSurface::new(
        Arc::clone(&session),
        GestureThresholds::default(),
        RecordingSurface::default(),
        HighlightStyle::default(),
    );
    surface.set_viewport(Viewport::new(100.0, 200.0).with_offset(10.0, 20.0));
    assert!(surface.sync_frame());
    (session, surface)
}

fn hover_text(state: &HoverState) -> Option<&str> {
    match state {
        HoverState::Element(e) => e.text.as_deref(),
        _ => None,
    }
}

#[test]
fn hover_highlights_smallest_clickable_under_pointer() {
    let (_, mut surface) = surface_with_frame();

    let state = surface.update_hover(DisplayPoint::new(7.5, 7.5)).unwrap();
    assert_eq!(hover_text(state), Some("Inner"));

    let rect = surface.highlight().drawn().unwrap().rect;
    assert_eq!((rect.left, rect.top), (15.0, 25.0));

    surface.update_hover(DisplayPoint::new(40.0, 40.0)).unwrap();
    assert_eq!(hover_text(surface.hover()), Some("Outer"));
}

#[test]
fn hover_over_nothing_clickable_is_explicit_none() {
    let (_, mut surface) = surface_with_frame();
    assert_eq!(*surface.hover(), HoverState::Unqueried);

    surface.update_hover(DisplayPoint::new(50.0, 150.0)).unwrap();
    assert_eq!(*surface.hover(), HoverState::Nothing);
    assert!(surface.highlight().drawn().is_none());
}

#[test]
fn hover_outside_image_clears_highlight() {
    let (_, mut surface) = surface_with_frame();
    surface.update_hover(DisplayPoint::new(7.5, 7.5)).unwrap();

    surface.update_hover(DisplayPoint::new(150.0, 10.0)).unwrap();
    assert_eq!(*surface.hover(), HoverState::Nothing);
    assert!(surface.highlight().drawn().is_none());
}

#[test]
fn leave_clears_hover_and_pointer() {
    let (_, mut surface) = surface_with_frame();
    surface.update_hover(DisplayPoint::new(7.5, 7.5)).unwrap();

    let intent = surface
        .handle(PointerEvent::Leave {
            position: DisplayPoint::new(-5.0, 7.5),
            at_ms: 10,
        })
        .unwrap();

    assert!(intent.is_none());
    assert!(surface.pointer().is_none());
    assert_eq!(*surface.hover(), HoverState::Unqueried);
    assert!(surface.highlight().drawn().is_none());
}

#[test]
fn new_frame_reevaluates_hover_at_last_pointer() {
    let (session, mut surface) = surface_with_frame();
    surface.update_hover(DisplayPoint::new(7.5, 7.5)).unwrap();
    let draws_before = surface.highlight().surface().draws.len();

    install_nested(&session);
    assert!(surface.sync_frame());

    assert_eq!(hover_text(surface.hover()), Some("Inner"));
    assert_eq!(surface.highlight().surface().draws.len(), draws_before + 1);
    assert!(!surface.sync_frame(), "same frame is not applied twice");
}

#[test]
fn press_release_becomes_swipe_in_source_space() {
    let (_, mut surface) = surface_with_frame();

    surface
        .handle(PointerEvent::Press {
            position: DisplayPoint::new(50.0, 180.0),
            at_ms: 0,
        })
        .unwrap();
    assert!(surface.is_dragging());

    let intent = surface
        .handle(PointerEvent::Release {
            position: DisplayPoint::new(50.0, 20.0),
            at_ms: 400,
        })
        .unwrap();

    assert_eq!(
        intent,
        Some(GestureIntent::Swipe {
            start_x: 100,
            start_y: 360,
            end_x: 100,
            end_y: 40,
            direction: SwipeDirection::Up,
        })
    );
}

#[test]
fn quick_click_becomes_tap() {
    let (_, mut surface) = surface_with_frame();
    surface
        .handle(PointerEvent::Press {
            position: DisplayPoint::new(7.5, 7.5),
            at_ms: 0,
        })
        .unwrap();
    let intent = surface
        .handle(PointerEvent::Release {
            position: DisplayPoint::new(8.0, 7.5),
            at_ms: 80,
        })
        .unwrap();
    assert_eq!(intent, Some(GestureIntent::Tap { x: 15, y: 15 }));
}

#[test]
fn leave_mid_drag_completes_the_gesture() {
    let (_, mut surface) = surface_with_frame();
    surface
        .handle(PointerEvent::Press {
            position: DisplayPoint::new(10.0, 100.0),
            at_ms: 0,
        })
        .unwrap();
    let intent = surface
        .handle(PointerEvent::Leave {
            position: DisplayPoint::new(90.0, 100.0),
            at_ms: 300,
        })
        .unwrap();
    assert!(matches!(
        intent,
        Some(GestureIntent::Swipe { direction: SwipeDirection::Right, .. })
    ));
}

#[test]
fn press_during_gesture_is_busy_and_silent() {
    let (session, mut surface) = surface_with_frame();
    session.begin_gesture().unwrap();

    let err = surface
        .handle(PointerEvent::Press {
            position: DisplayPoint::new(10.0, 10.0),
            at_ms: 0,
        })
        .unwrap_err();
    assert_eq!(err, ConsoleError::Busy);
    assert!(err.is_silent());
    assert!(!surface.is_dragging());
}

#[test]
fn press_before_layout_is_unavailable() {
    let session = Arc::new(SessionState::new());
    install_nested(&session);
    let mut surface = InteractionSurface::new(
        session,
        GestureThresholds::default(),
        RecordingSurface::default(),
        HighlightStyle::default(),
    );
    surface.sync_frame();

    let err = surface
        .handle(PointerEvent::Press {
            position: DisplayPoint::new(10.0, 10.0),
            at_ms: 0,
        })
        .unwrap_err();
    assert_eq!(err, ConsoleError::GeometryUnavailable);
    assert!(err.is_silent());
}

#[test]
fn viewport_resize_moves_the_highlight() {
    let (_, mut surface) = surface_with_frame();
    surface.update_hover(DisplayPoint::new(7.5, 7.5)).unwrap();

    surface.set_viewport(Viewport::new(200.0, 400.0));
    let rect = surface.highlight().drawn().unwrap().rect;
    assert_eq!((rect.left, rect.top, rect.width), (10.0, 10.0, 10.0));
}

#[test]
fn hover_over_empty_index_is_explicit_none() {
    let (session, mut surface) = surface_with_frame();
    surface.update_hover(DisplayPoint::new(7.5, 7.5)).unwrap();
    assert!(surface.highlight().drawn().is_some());

    let empty = Snapshot::from_payload(payload("<hierarchy/>", NESTED_WIDTH, NESTED_HEIGHT)).unwrap();
    let ticket = session.issue_ticket();
    session.install(ticket, empty).unwrap();
    assert!(surface.sync_frame());

    assert_eq!(*surface.hover(), HoverState::Nothing);
    assert!(surface.highlight().drawn().is_none());

    surface.update_hover(DisplayPoint::new(40.0, 40.0)).unwrap();
    assert_eq!(*surface.hover(), HoverState::Nothing);
}

#[test]
fn ended_session_resets_pointer_hover_and_highlight() {
    let (session, mut surface) = surface_with_frame();
    session.activate();
    install_nested(&session);
    assert!(surface.sync_frame());
    surface.update_hover(DisplayPoint::new(7.5, 7.5)).unwrap();
    assert_eq!(hover_text(surface.hover()), Some("Inner"));

    session.deactivate();
    assert!(surface.sync_frame());

    assert!(surface.frame().is_none());
    assert!(surface.pointer().is_none());
    assert_eq!(*surface.hover(), HoverState::Unqueried);
    assert!(surface.highlight().drawn().is_none());

    // Nothing left to hit-test against
    surface.update_hover(DisplayPoint::new(7.5, 7.5)).unwrap();
    assert_eq!(*surface.hover(), HoverState::Unqueried);
    assert!(!surface.sync_frame());
}

#[test]
fn reset_forgets_frame_and_pointer() {
    let (_, mut surface) = surface_with_frame();
    surface.update_hover(DisplayPoint::new(7.5, 7.5)).unwrap();

    surface.reset();
    assert!(surface.frame().is_none());
    assert!(surface.pointer().is_none());
    assert!(surface.highlight().drawn().is_none());
    assert_eq!(surface.layout(), Err(ConsoleError::GeometryUnavailable));
}
