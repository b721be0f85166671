use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageReader;
use sha1::{Digest, Sha1};
use tracing::warn;

use crate::backend::backend_model::SnapshotPayload;
use crate::console::error::ConsoleError;
use crate::hierarchy::hierarchy_model::HierarchyTree;
use crate::hierarchy::index::ElementIndex;
use crate::hierarchy::parser::parse_hierarchy;

/// Decoded snapshot image. The payload is kept as the original data URL so a
/// front-end can display it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotImage {
    pub data_url: String,
    pub natural_width: u32,
    pub natural_height: u32,
}

/// Image and hierarchy captured by one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub image: SnapshotImage,
    pub hierarchy: HierarchyTree,
    pub fingerprint: Option<String>,
    pub captured_at: Option<i64>,
}

impl Snapshot {
    /// Decode a `/screenshot` payload.
    ///
    /// The image must decode (its natural size drives every coordinate
    /// mapping). A missing or malformed hierarchy only empties the tree.
    pub fn from_payload(payload: SnapshotPayload) -> Result<Self, ConsoleError> {
        let data_url = payload.image_data.ok_or_else(|| ConsoleError::Parse {
            context: "snapshot".into(),
            message: "payload has no image_data".into(),
        })?;
        let image = decode_image(data_url)?;

        let (hierarchy, fingerprint) = match payload.hierarchy.as_deref() {
            Some(xml) => {
                let tree = parse_hierarchy(xml).unwrap_or_else(|e| {
                    warn!(error = %e, "discarding unparsable hierarchy");
                    HierarchyTree::default()
                });
                (tree, Some(fingerprint(xml)))
            }
            None => {
                warn!("snapshot arrived without a hierarchy");
                (HierarchyTree::default(), None)
            }
        };

        Ok(Self {
            image,
            hierarchy,
            fingerprint,
            captured_at: payload.timestamp,
        })
    }
}

/// Snapshot together with the element index built from it. Readers only
/// ever see a whole frame, never a snapshot paired with another index.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub seq: u64,
    pub snapshot: Snapshot,
    pub index: ElementIndex,
}

impl Frame {
    pub fn build(seq: u64, snapshot: Snapshot) -> Self {
        let index = ElementIndex::build(&snapshot.hierarchy);
        Self { seq, snapshot, index }
    }
}

/// Read the natural size of a `data:image/...;base64,` URL (or bare base64).
pub fn decode_image(data_url: String) -> Result<SnapshotImage, ConsoleError> {
    let encoded = match data_url.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => data_url.as_str(),
    };

    let bytes = STANDARD.decode(encoded.trim()).map_err(|e| image_error(e.to_string()))?;

    let (natural_width, natural_height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| image_error(e.to_string()))?
        .into_dimensions()
        .map_err(|e| image_error(e.to_string()))?;

    Ok(SnapshotImage {
        data_url,
        natural_width,
        natural_height,
    })
}

pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn image_error(message: String) -> ConsoleError {
    ConsoleError::Parse {
        context: "snapshot image".into(),
        message,
    }
}
