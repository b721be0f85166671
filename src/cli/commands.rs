use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::backend::backend_model::{ActionAck, ActionRecord, SessionInfo};
use crate::backend::http::HttpBackend;
use crate::backend::traits::{ActionExecutor, SessionLifecycle, SnapshotProvider};
use crate::cli::config::{ConsoleConfig, parse_point, parse_size};
use crate::console::controller::Console;
use crate::console::error::ConsoleError;
use crate::console::status::StatusMessage;
use crate::console::surface::{HoverState, InteractionSurface};
use crate::geometry::geometry_model::{DisplayPoint, Viewport};
use crate::gesture::classifier::swipe_direction;
use crate::gesture::gesture_model::GestureIntent;
use crate::gesture::pointer::PointerEvent;
use crate::overlay::highlight::LogSurface;
use crate::session::frame::{Frame, Snapshot};
use crate::trace::logger::TraceLogger;

type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

// ============================================================================
// Wiring
// ============================================================================

pub fn build_backend(config: &ConsoleConfig) -> Result<HttpBackend, ConsoleError> {
    HttpBackend::new(&config.backend.url, Duration::from_secs(config.backend.timeout_secs))
}

pub fn build_console(config: &ConsoleConfig) -> Result<Console<HttpBackend>, ConsoleError> {
    let backend = Arc::new(build_backend(config)?);
    let trace = match &config.trace.path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };
    Ok(Console::new(backend, config.refresh, trace))
}

/// Print the operator-facing outcome of an action and pass the error on.
fn report<T>(action: &str, result: Result<T, ConsoleError>) -> CmdResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Some(status) = StatusMessage::from_error(action, &e) {
                eprintln!("{}", status);
            }
            Err(e.into())
        }
    }
}

fn describe_ack(action: &str, ack: &ActionAck) -> StatusMessage {
    let mut text = format!("{} acknowledged ({} actions recorded)", action, ack.action_count);
    if let Some(bounds) = &ack.clicked_bounds {
        text.push_str(&format!(", element bounds {:?}", bounds));
    }
    StatusMessage::success(text)
}

async fn fetch_frame(config: &ConsoleConfig) -> CmdResult<Frame> {
    let backend = build_backend(config)?;
    let payload = report("snapshot", backend.fetch_snapshot().await)?;
    let snapshot = report("snapshot", Snapshot::from_payload(payload))?;
    Ok(Frame::build(1, snapshot))
}

// ============================================================================
// snapshot / hit-test
// ============================================================================

pub async fn cmd_snapshot(config: &ConsoleConfig, clickable_only: bool) -> CmdResult {
    let frame = fetch_frame(config).await?;
    let image = &frame.snapshot.image;

    println!(
        "Snapshot {}x{}: {} elements ({} clickable, {} skipped)",
        image.natural_width,
        image.natural_height,
        frame.index.len(),
        frame.index.clickable_count(),
        frame.index.skipped()
    );
    if let Some(fp) = &frame.snapshot.fingerprint {
        println!("  fingerprint {}", fp);
    }

    for element in frame.index.elements() {
        if clickable_only && !element.clickable {
            continue;
        }
        println!(
            "  {} {}{} {}",
            element.bounds_text,
            element.class_name,
            if element.clickable { " [clickable]" } else { "" },
            element.label()
        );
    }
    Ok(())
}

pub async fn cmd_hit_test(config: &ConsoleConfig, x: f64, y: f64) -> CmdResult {
    let frame = fetch_frame(config).await?;

    match frame.index.hit_test(x, y) {
        Some(element) => println!(
            "({}, {}) -> {} {} \"{}\" area={}",
            x,
            y,
            element.bounds_text,
            element.class_name,
            element.label(),
            element.area()
        ),
        None => println!("({}, {}) -> no clickable element", x, y),
    }
    Ok(())
}

// ============================================================================
// Actions
// ============================================================================

fn intent_label(intent: &GestureIntent) -> &'static str {
    match intent {
        GestureIntent::Tap { .. } => "tap",
        GestureIntent::Swipe { .. } => "swipe",
    }
}

async fn dispatch(config: &ConsoleConfig, intent: GestureIntent) -> CmdResult {
    let console = build_console(config)?;
    let label = intent_label(&intent);

    let ack = report(label, console.dispatch(intent).await)?;
    println!("{}", describe_ack(label, &ack));
    Ok(())
}

pub async fn cmd_tap(config: &ConsoleConfig, x: i32, y: i32) -> CmdResult {
    dispatch(config, GestureIntent::Tap { x, y }).await
}

pub async fn cmd_swipe(config: &ConsoleConfig, start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> CmdResult {
    let direction = swipe_direction(
        i64::from(end_x) - i64::from(start_x),
        i64::from(end_y) - i64::from(start_y),
    );
    dispatch(
        config,
        GestureIntent::Swipe {
            start_x,
            start_y,
            end_x,
            end_y,
            direction,
        },
    )
    .await
}

/// Replay a display-space drag through the pointer pipeline, then dispatch
/// whatever it classifies as.
pub async fn cmd_gesture(config: &ConsoleConfig, from: &str, to: &str, duration_ms: u64, display: &str) -> CmdResult {
    let (from_x, from_y) = parse_point(from)?;
    let (to_x, to_y) = parse_point(to)?;
    let (width, height) = parse_size(display)?;

    let console = build_console(config)?;
    report("snapshot", console.refresh_now().await)?;

    let mut surface = InteractionSurface::new(
        Arc::clone(console.session()),
        config.gesture,
        LogSurface,
        config.highlight.clone(),
    );
    surface.set_viewport(Viewport::new(width, height));
    surface.sync_frame();

    let start = DisplayPoint::new(from_x, from_y);
    let end = DisplayPoint::new(to_x, to_y);

    report("gesture", surface.handle(PointerEvent::Press { position: start, at_ms: 0 }))?;
    if let Ok(HoverState::Element(element)) = surface.update_hover(start) {
        println!("  pressed on {} \"{}\"", element.bounds_text, element.label());
    }
    report("gesture", surface.handle(PointerEvent::Move { position: end, at_ms: duration_ms }))?;
    let intent = report(
        "gesture",
        surface.handle(PointerEvent::Release {
            position: end,
            at_ms: duration_ms,
        }),
    )?;

    let Some(intent) = intent else {
        println!("{}", StatusMessage::info("no gesture recognised"));
        return Ok(());
    };

    println!("  classified as {}", intent);
    let label = intent_label(&intent);
    let ack = report(label, console.dispatch(intent).await)?;
    println!("{}", describe_ack(label, &ack));
    Ok(())
}

pub async fn cmd_input(config: &ConsoleConfig, text: &str) -> CmdResult {
    let backend = build_backend(config)?;
    let text = text.trim();
    if text.is_empty() {
        return report("input", Err(ConsoleError::InvalidInput("text is empty".into())));
    }

    // The collection server owns the session across invocations, so the
    // text goes straight to the backend.
    let ack = report("input", backend.input_text(text).await)?;
    println!("{}", describe_ack("input", &ack));
    Ok(())
}

pub async fn cmd_history(config: &ConsoleConfig) -> CmdResult {
    let console = build_console(config)?;
    let page = report("history", console.history().await)?;

    println!("{} actions recorded", page.total_actions);
    for (i, entry) in page.actions.iter().enumerate() {
        let line = match &entry.action {
            ActionRecord::Click {
                position_x,
                position_y,
                bounds,
            } => match bounds {
                Some(b) => format!("click ({}, {}) on {:?}", position_x, position_y, b),
                None => format!("click ({}, {})", position_x, position_y),
            },
            ActionRecord::Swipe {
                press_position_x,
                press_position_y,
                release_position_x,
                release_position_y,
                direction,
            } => format!(
                "swipe {} ({}, {}) -> ({}, {})",
                direction, press_position_x, press_position_y, release_position_x, release_position_y
            ),
            ActionRecord::Input { text } => format!("input \"{}\"", text),
            ActionRecord::Done => "done".to_string(),
        };
        println!("  {:>3}. {}", i + 1, line);
    }
    Ok(())
}

// ============================================================================
// Session lifecycle
// ============================================================================

pub async fn cmd_begin(config: &ConsoleConfig, info: SessionInfo) -> CmdResult {
    // One-shot: nothing would keep a refresh loop alive after exit.
    let mut config = config.clone();
    config.refresh.auto_start = false;

    let console = build_console(&config)?;
    let app = info.app_name.clone();
    let frame = report("begin", console.begin_session(info).await)?;

    println!("{}", StatusMessage::success(format!("session started for {}", app)));
    if let Some(frame) = frame {
        println!("  initial snapshot: {} elements", frame.index.len());
    }
    Ok(())
}

pub async fn cmd_end(config: &ConsoleConfig) -> CmdResult {
    let backend = build_backend(config)?;
    let receipt = report("save", backend.end_session().await)?;
    println!(
        "{}",
        StatusMessage::success(format!(
            "saved {} actions as task #{}",
            receipt.saved_actions, receipt.data_index
        ))
    );
    Ok(())
}

pub async fn cmd_next(config: &ConsoleConfig, info: SessionInfo) -> CmdResult {
    let backend = build_backend(config)?;
    let receipt = report("save", backend.end_session().await)?;
    report("begin", backend.begin_session(&info).await)?;

    println!(
        "{}",
        StatusMessage::success(format!(
            "saved task #{} ({} actions), next task started",
            receipt.data_index, receipt.saved_actions
        ))
    );
    Ok(())
}

pub async fn cmd_discard(config: &ConsoleConfig, info: SessionInfo) -> CmdResult {
    let backend = build_backend(config)?;
    let receipt = report("discard", backend.discard_session().await)?;
    report("begin", backend.begin_session(&info).await)?;

    println!(
        "{}",
        StatusMessage::success(format!("discarded task #{}, task restarted", receipt.data_index))
    );
    Ok(())
}

// ============================================================================
// watch
// ============================================================================

/// Begin a session and keep the refresh loop running for `seconds`,
/// printing every installed snapshot. The session is left open on the
/// server.
pub async fn cmd_watch(config: &ConsoleConfig, info: SessionInfo, seconds: u64) -> CmdResult {
    let console = build_console(config)?;
    let mut frames = console.session().subscribe();

    report("begin", console.begin_session(info).await)?;
    if !console.scheduler().is_running() {
        report("refresh", console.set_auto_refresh(true))?;
    }

    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = frames.borrow_and_update().clone();
                if let Some(frame) = frame {
                    println!(
                        "  #{} {} elements, {} clickable, fingerprint {}",
                        frame.seq,
                        frame.index.len(),
                        frame.index.clickable_count(),
                        frame.snapshot.fingerprint.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }

    console.scheduler().stop();
    console.scheduler().join().await;
    info!(seconds, "watch finished");
    Ok(())
}
