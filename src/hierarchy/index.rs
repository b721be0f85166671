use crate::hierarchy::hierarchy_model::{ElementRecord, HierarchyNode, HierarchyTree};
use crate::hierarchy::parser::parse_bounds;

/// Flattened element records for one snapshot, in document order.
///
/// Built once per snapshot and never mutated afterwards; a refresh builds a
/// new index instead of patching this one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementIndex {
    elements: Vec<ElementRecord>,
    skipped: usize,
}

impl ElementIndex {
    /// Depth-first (pre-order) flattening of the tree. Nodes whose bounds are
    /// absent or malformed produce no record; their children are still visited.
    pub fn build(tree: &HierarchyTree) -> Self {
        let mut index = ElementIndex::default();
        for root in &tree.roots {
            index.collect(root);
        }
        index
    }

    pub fn empty() -> Self {
        Self::default()
    }

    fn collect(&mut self, node: &HierarchyNode) {
        match node.bounds.as_deref().and_then(parse_bounds) {
            Some(bounds) => self.elements.push(ElementRecord::from_node(node, bounds)),
            None => self.skipped += 1,
        }

        for child in &node.children {
            self.collect(child);
        }
    }

    pub fn elements(&self) -> &[ElementRecord] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Nodes dropped because their bounds could not be parsed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn clickable_count(&self) -> usize {
        self.elements.iter().filter(|e| e.clickable).count()
    }

    /// Smallest clickable element containing `(x, y)` in source space.
    ///
    /// Containment is edge-inclusive. On equal areas the first element in
    /// document order wins. Non-clickable elements never match.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&ElementRecord> {
        let mut best: Option<&ElementRecord> = None;

        for element in self.elements.iter().filter(|e| e.clickable) {
            if !element.bounds.contains(x, y) {
                continue;
            }
            match best {
                Some(current) if current.area() <= element.area() => {}
                _ => best = Some(element),
            }
        }

        best
    }
}
