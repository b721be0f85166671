use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;
use tracing::debug;

use crate::console::error::ConsoleError;
use crate::hierarchy::hierarchy_model::{Bounds, HierarchyNode, HierarchyTree};

// Exact wire format: `[left,top][right,bottom]`, non-negative integers only.
static BOUNDS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(\d+),(\d+)\]\[(\d+),(\d+)\]$").expect("bounds pattern is valid"));

/// Parse a `bounds` attribute. Anything that is not exactly
/// `[left,top][right,bottom]` yields `None`.
pub fn parse_bounds(raw: &str) -> Option<Bounds> {
    let caps = BOUNDS_PATTERN.captures(raw)?;
    let mut values = [0i32; 4];
    for (slot, value) in values.iter_mut().enumerate() {
        *value = caps.get(slot + 1)?.as_str().parse().ok()?;
    }
    let [left, top, right, bottom] = values;
    Some(Bounds::new(left, top, right, bottom))
}

/// Parse a uiautomator-style XML dump into a `HierarchyTree`.
///
/// Only `<node>` elements become tree nodes; the `<hierarchy>` wrapper
/// contributes its `rotation` attribute. A document that is not well formed
/// is a `ConsoleError::Parse`; an unreadable attribute only loses that
/// attribute, so a node with broken `bounds` drops out of the index alone.
pub fn parse_hierarchy(xml: &str) -> Result<HierarchyTree, ConsoleError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut tree = HierarchyTree::default();
    let mut stack: Vec<HierarchyNode> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"node" => {
                stack.push(node_from_tag(&e));
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"node" => {
                let node = node_from_tag(&e);
                attach(&mut stack, &mut tree, node);
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"hierarchy" => {
                tree.rotation = attribute(&e, b"rotation").and_then(|r| r.parse().ok());
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"node" => {
                let node = stack.pop().ok_or_else(|| parse_error("unbalanced </node>"))?;
                attach(&mut stack, &mut tree, node);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(parse_error(format!(
                    "xml error at byte {}: {}",
                    reader.error_position(),
                    e
                )));
            }
        }
    }

    if !stack.is_empty() {
        return Err(parse_error(format!("{} unclosed <node> element(s)", stack.len())));
    }

    Ok(tree)
}

fn attach(stack: &mut [HierarchyNode], tree: &mut HierarchyTree, node: HierarchyNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => tree.roots.push(node),
    }
}

fn node_from_tag(tag: &BytesStart<'_>) -> HierarchyNode {
    let mut node = HierarchyNode::default();

    for (key, value) in attributes(tag) {
        match key.as_slice() {
            b"bounds" => node.bounds = Some(value),
            b"class" => node.class_name = value,
            b"resource-id" => node.resource_id = non_empty(value),
            b"text" => node.text = non_empty(value),
            b"content-desc" => node.content_desc = non_empty(value),
            b"clickable" => node.clickable = value == "true",
            b"package" => node.package = value,
            _ => {}
        }
    }

    node
}

/// Readable attributes of `tag` as owned key/value pairs. Attributes that
/// fail to parse or unescape are skipped.
fn attributes(tag: &BytesStart<'_>) -> Vec<(Vec<u8>, String)> {
    let mut out = Vec::new();
    for attr in tag.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(e) => {
                debug!(error = %e, "skipping malformed attribute");
                continue;
            }
        };
        match attr.unescape_value() {
            Ok(value) => out.push((attr.key.as_ref().to_vec(), value.into_owned())),
            Err(e) => {
                debug!(
                    key = %String::from_utf8_lossy(attr.key.as_ref()),
                    error = %e,
                    "skipping attribute with bad value"
                );
            }
        }
    }
    out
}

fn attribute(tag: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    attributes(tag).into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn parse_error(message: impl Into<String>) -> ConsoleError {
    ConsoleError::Parse {
        context: "hierarchy".into(),
        message: message.into(),
    }
}
