use std::io::Cursor;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{GrayImage, ImageFormat};

use collect_console::backend::backend_model::{SessionInfo, SnapshotPayload};
use collect_console::session::frame::{Frame, Snapshot};
use collect_console::session::state::SessionState;

/// Blank PNG of the given size as a `data:` URL.
pub fn png_data_url(width: u32, height: u32) -> String {
    let mut bytes = Cursor::new(Vec::new());
    GrayImage::new(width, height)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(bytes.into_inner()))
}

/// Two clickable regions, one nested inside the other, plus a
/// non-clickable container and a node with broken bounds.
///
/// - A `[0,0][100,100]` clickable, "Outer"
/// - B `[10,10][20,20]` clickable, "Inner"
/// - C `[0,200][200,400]` not clickable
/// - D `garbage` clickable, dropped from the index
pub const NESTED_XML: &str = r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>
<hierarchy rotation="0">
  <node index="0" text="" resource-id="" class="android.widget.FrameLayout" package="com.example.app" content-desc="" clickable="false" bounds="[0,0][200,400]">
    <node index="0" text="Outer" resource-id="com.example.app:id/outer" class="android.widget.LinearLayout" package="com.example.app" content-desc="" clickable="true" bounds="[0,0][100,100]">
      <node index="0" text="Inner" resource-id="com.example.app:id/inner" class="android.widget.Button" package="com.example.app" content-desc="" clickable="true" bounds="[10,10][20,20]" />
    </node>
    <node index="1" text="" resource-id="" class="android.widget.TextView" package="com.example.app" content-desc="Banner" clickable="false" bounds="[0,200][200,400]" />
    <node index="2" text="Broken" resource-id="" class="android.view.View" package="com.example.app" content-desc="" clickable="true" bounds="garbage" />
  </node>
</hierarchy>"#;

pub const NESTED_WIDTH: u32 = 200;
pub const NESTED_HEIGHT: u32 = 400;

pub fn payload(xml: &str, width: u32, height: u32) -> SnapshotPayload {
    SnapshotPayload {
        status: Some("success".into()),
        image_data: Some(png_data_url(width, height)),
        hierarchy: Some(xml.to_string()),
        timestamp: Some(1_700_000_000),
    }
}

pub fn nested_payload() -> SnapshotPayload {
    payload(NESTED_XML, NESTED_WIDTH, NESTED_HEIGHT)
}

pub fn nested_snapshot() -> Snapshot {
    Snapshot::from_payload(nested_payload()).unwrap()
}

/// Install the nested snapshot into `session` and return the frame.
pub fn install_nested(session: &SessionState) -> Arc<Frame> {
    let ticket = session.issue_ticket();
    session.install(ticket, nested_snapshot()).unwrap()
}

pub fn task(description: &str) -> SessionInfo {
    SessionInfo {
        app_name: "Settings".into(),
        task_type: "navigation".into(),
        description: description.into(),
    }
}
