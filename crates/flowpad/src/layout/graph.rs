//! The graph handed to layout engines.

use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use flowpad_core::{direction::Direction, geometry::Size};

use super::LayoutOptions;

/// A node as the engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    id: String,
    size: Size,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, size: Size) -> Self {
        Self {
            id: id.into(),
            size,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Directed graph of diagram nodes plus the direction and spacing to lay
/// it out with.
///
/// Node indices follow the order nodes were added, which matches the
/// diagram's node sequence.
#[derive(Debug, Clone)]
pub struct LayoutGraph {
    graph: DiGraph<LayoutNode, ()>,
    direction: Direction,
    options: LayoutOptions,
}

impl LayoutGraph {
    pub fn new(direction: Direction, options: LayoutOptions) -> Self {
        Self {
            graph: DiGraph::new(),
            direction,
            options,
        }
    }

    pub(super) fn add_node(&mut self, node: LayoutNode) -> usize {
        self.graph.add_node(node).index()
    }

    pub(super) fn add_edge(&mut self, source: usize, target: usize) {
        self.graph
            .add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn options(&self) -> LayoutOptions {
        self.options
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, index: usize) -> Option<&LayoutNode> {
        self.graph.node_weight(NodeIndex::new(index))
    }

    /// Nodes with their indices, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, &LayoutNode)> {
        self.graph
            .node_indices()
            .map(|index| (index.index(), &self.graph[index]))
    }

    /// Edges as `(source, target)` index pairs, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
    }
}
