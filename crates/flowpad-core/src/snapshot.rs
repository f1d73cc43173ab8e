//! The persisted form of a diagram.

use serde::{Deserialize, Serialize};

use crate::{edge::Edge, node::Node, viewport::Viewport};

/// Nodes, edges and viewport captured together.
///
/// Missing fields deserialize to empty sequences and the default viewport,
/// so a partially written value still restores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    viewport: Viewport,
}

impl Snapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, viewport: Viewport) -> Self {
        Self {
            nodes,
            edges,
            viewport,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Names the first element holding a number JSON cannot represent.
    pub fn find_non_finite(&self) -> Option<String> {
        if let Some(node) = self.nodes.iter().find(|node| !node.is_finite()) {
            return Some(format!("node `{}`", node.id()));
        }
        (!self.viewport.is_finite()).then(|| "the viewport".to_string())
    }

    /// Splits the snapshot into its parts.
    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>, Viewport) {
        (self.nodes, self.edges, self.viewport)
    }
}
