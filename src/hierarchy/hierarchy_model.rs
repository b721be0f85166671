use serde::{Deserialize, Serialize};

/// A device UI hierarchy: the forest of `<node>` elements under the dump root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyTree {
    pub rotation: Option<u32>,
    pub roots: Vec<HierarchyNode>,
}

impl HierarchyTree {
    /// Number of nodes in the whole tree, including ones without usable bounds.
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(HierarchyNode::subtree_len).sum()
    }
}

/// One rectangular UI region as reported by the device.
///
/// `bounds` is kept as the raw attribute text; it only becomes a `Bounds`
/// when the element index is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub bounds: Option<String>,
    pub class_name: String,
    pub resource_id: Option<String>,
    pub text: Option<String>,
    pub content_desc: Option<String>,
    pub clickable: bool,
    pub package: String,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(HierarchyNode::subtree_len).sum::<usize>()
    }
}

/// Source-space rectangle `[left,top][right,bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    // Inverted rectangles collapse to zero extent.
    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Edge-inclusive containment.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left as f64 && x <= self.right as f64 && y >= self.top as f64 && y <= self.bottom as f64
    }
}

/// Flattened, child-free projection of a `HierarchyNode` with parsed bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub bounds_text: String,
    pub bounds: Bounds,
    pub width: i32,
    pub height: i32,
    pub class_name: String,
    pub resource_id: Option<String>,
    pub text: Option<String>,
    pub content_desc: Option<String>,
    pub clickable: bool,
    pub package: String,
}

impl ElementRecord {
    pub fn from_node(node: &HierarchyNode, bounds: Bounds) -> Self {
        Self {
            bounds_text: node.bounds.clone().unwrap_or_default(),
            bounds,
            width: bounds.width(),
            height: bounds.height(),
            class_name: node.class_name.clone(),
            resource_id: node.resource_id.clone(),
            text: node.text.clone(),
            content_desc: node.content_desc.clone(),
            clickable: node.clickable,
            package: node.package.clone(),
        }
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Short human-readable label: text, then description, then resource id,
    /// falling back to the class name.
    pub fn label(&self) -> &str {
        self.text
            .as_deref()
            .or(self.content_desc.as_deref())
            .or(self.resource_id.as_deref())
            .unwrap_or(&self.class_name)
    }
}
