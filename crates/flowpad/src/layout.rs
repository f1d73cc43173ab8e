//! Layered layout of the diagram.
//!
//! A layout runs in three steps:
//!
//! 1. [`prepare`] annotates every node with the fixed layout size and the
//!    handle orientation of the requested [`Direction`], and builds a
//!    [`LayoutGraph`] from the nodes and the edges whose endpoints exist.
//! 2. A [`LayoutEngine`] arranges the graph into [`NodePlacement`]s.
//! 3. [`LayoutRequest::run`] writes each placement onto its node and hands
//!    back nodes and edges together so the store can swap them at once.
//!
//! Requests carry a [`LayoutTicket`]. The editor only applies the result of
//! its most recent ticket, so a slow layout that finishes after a newer one
//! was requested is dropped.

mod engines;
mod graph;

pub use engines::{LayoutEngine, sugiyama::SugiyamaEngine};
pub use graph::{LayoutGraph, LayoutNode};

use std::collections::HashMap;

use log::{debug, trace};
use thiserror::Error;

use flowpad_core::{
    direction::Direction,
    edge::Edge,
    geometry::{Point, Size},
    node::Node,
};

use crate::config::LayoutConfig;

/// Errors reported by a layout engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("layout engine panicked: {0}")]
    EnginePanicked(String),

    #[error("no placement for node `{0}`")]
    MissingPlacement(String),

    #[error("{0}")]
    Engine(String),
}

/// Spacing and sizing handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    node_size: Size,
    layer_spacing: f32,
    node_spacing: f32,
    padding: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

impl From<&LayoutConfig> for LayoutOptions {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            node_size: config.node_size(),
            layer_spacing: config.layer_spacing(),
            node_spacing: config.node_spacing(),
            padding: config.padding(),
        }
    }
}

impl LayoutOptions {
    pub fn node_size(&self) -> Size {
        self.node_size
    }

    pub fn layer_spacing(&self) -> f32 {
        self.layer_spacing
    }

    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }
}

/// Top-left position chosen for the node at `index` in the prepared
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePlacement {
    pub index: usize,
    pub position: Point,
}

impl NodePlacement {
    pub fn new(index: usize, position: Point) -> Self {
        Self { index, position }
    }
}

/// Identifies one layout request. Later requests get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutTicket(u64);

impl LayoutTicket {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns the ticket issued after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Annotates `nodes` for layout and builds the graph the engine reads.
///
/// Every node gets `options.node_size` and the handle orientation of
/// `direction`. Edges with an endpoint missing from `nodes` are left out of
/// the graph; they still travel with the result untouched.
pub fn prepare(
    nodes: &[Node],
    edges: &[Edge],
    direction: Direction,
    options: LayoutOptions,
) -> (Vec<Node>, LayoutGraph) {
    let mut graph = LayoutGraph::new(direction, options);
    let mut indices = HashMap::new();

    let prepared: Vec<Node> = nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();
            node.set_size(options.node_size());
            node.set_handles(direction.target_handle(), direction.source_handle());

            let index = graph.add_node(LayoutNode::new(node.id(), options.node_size()));
            // Duplicate ids resolve to the first node carrying them
            indices.entry(node.id().to_string()).or_insert(index);
            node
        })
        .collect();

    for edge in edges {
        match (indices.get(edge.source()), indices.get(edge.target())) {
            (Some(&source), Some(&target)) => graph.add_edge(source, target),
            _ => debug!(edge = edge.id(); "Skipping dangling edge in layout"),
        }
    }

    trace!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        direction:% = direction;
        "Layout graph prepared"
    );

    (prepared, graph)
}

/// Nodes and edges after a successful layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOutcome {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// A prepared layout waiting to be run.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    ticket: LayoutTicket,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    graph: LayoutGraph,
}

impl LayoutRequest {
    /// Prepares a request for the given graph.
    pub fn new(
        ticket: LayoutTicket,
        nodes: &[Node],
        edges: &[Edge],
        direction: Direction,
        options: LayoutOptions,
    ) -> Self {
        let (nodes, graph) = prepare(nodes, edges, direction, options);
        Self {
            ticket,
            nodes,
            edges: edges.to_vec(),
            graph,
        }
    }

    pub fn ticket(&self) -> LayoutTicket {
        self.ticket
    }

    pub fn direction(&self) -> Direction {
        self.graph.direction()
    }

    pub fn graph(&self) -> &LayoutGraph {
        &self.graph
    }

    /// Arranges the graph with `engine` and writes the placements onto the
    /// nodes.
    ///
    /// # Errors
    ///
    /// Returns the engine's error, or [`LayoutError::MissingPlacement`] if
    /// the engine left a node unplaced. Nothing is written in either case.
    pub fn run(self, engine: &dyn LayoutEngine) -> Result<LayoutOutcome, LayoutError> {
        let placements = engine.arrange(&self.graph)?;

        let mut positions: Vec<Option<Point>> = vec![None; self.nodes.len()];
        for placement in placements {
            if let Some(slot) = positions.get_mut(placement.index) {
                *slot = Some(placement.position);
            }
        }

        let mut nodes = self.nodes;
        for (node, position) in nodes.iter_mut().zip(positions) {
            let position =
                position.ok_or_else(|| LayoutError::MissingPlacement(node.id().to_string()))?;
            node.set_position(position);
        }

        debug!(
            ticket = self.ticket.value(),
            nodes = nodes.len();
            "Layout finished"
        );

        Ok(LayoutOutcome {
            nodes,
            edges: self.edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use flowpad_core::node::{HandlePosition, NodeKind};

    use super::*;

    struct Diagonal;

    impl LayoutEngine for Diagonal {
        fn arrange(&self, graph: &LayoutGraph) -> Result<Vec<NodePlacement>, LayoutError> {
            Ok(graph
                .nodes()
                .map(|(index, _)| NodePlacement::new(index, Point::new(index as f32, index as f32)))
                .collect())
        }
    }

    struct Failing;

    impl LayoutEngine for Failing {
        fn arrange(&self, _graph: &LayoutGraph) -> Result<Vec<NodePlacement>, LayoutError> {
            Err(LayoutError::Engine("boom".to_string()))
        }
    }

    struct Partial;

    impl LayoutEngine for Partial {
        fn arrange(&self, _graph: &LayoutGraph) -> Result<Vec<NodePlacement>, LayoutError> {
            Ok(vec![NodePlacement::new(0, Point::default())])
        }
    }

    fn sample() -> (Vec<Node>, Vec<Edge>) {
        (
            vec![
                Node::new("a", NodeKind::Input, "a"),
                Node::new("b", NodeKind::Output, "b"),
            ],
            vec![Edge::new("e", "a", "b"), Edge::new("dangling", "a", "zz")],
        )
    }

    #[test]
    fn test_prepare_annotates_nodes() {
        let (nodes, edges) = sample();
        let (prepared, graph) = prepare(&nodes, &edges, Direction::Right, LayoutOptions::default());

        for node in &prepared {
            assert_eq!(node.size(), Some(Size::new(150.0, 50.0)));
            assert_eq!(node.target_position(), Some(HandlePosition::Left));
            assert_eq!(node.source_position(), Some(HandlePosition::Right));
        }
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.direction(), Direction::Right);
    }

    #[test]
    fn test_run_writes_positions_and_keeps_edges() {
        let (nodes, edges) = sample();
        let request = LayoutRequest::new(
            LayoutTicket::new(3),
            &nodes,
            &edges,
            Direction::Down,
            LayoutOptions::default(),
        );
        assert_eq!(request.ticket(), LayoutTicket::new(3));

        let outcome = request.run(&Diagonal).unwrap();
        assert_eq!(outcome.nodes[1].position(), Point::new(1.0, 1.0));
        assert_eq!(outcome.edges, edges);
    }

    #[test]
    fn test_engine_failure_is_returned() {
        let (nodes, edges) = sample();
        let request = LayoutRequest::new(
            LayoutTicket::new(1),
            &nodes,
            &edges,
            Direction::Down,
            LayoutOptions::default(),
        );
        assert_eq!(
            request.run(&Failing),
            Err(LayoutError::Engine("boom".to_string()))
        );
    }

    #[test]
    fn test_missing_placement_is_an_error() {
        let (nodes, edges) = sample();
        let request = LayoutRequest::new(
            LayoutTicket::new(0),
            &nodes,
            &edges,
            Direction::Down,
            LayoutOptions::default(),
        );
        assert_eq!(
            request.run(&Partial),
            Err(LayoutError::MissingPlacement("b".to_string()))
        );
    }

    #[test]
    fn test_ticket_ordering() {
        let first = LayoutTicket::new(0);
        assert!(first.next() > first);
        assert_eq!(first.next().value(), 1);
    }
}
