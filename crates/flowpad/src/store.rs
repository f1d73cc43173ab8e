//! The diagram state store.
//!
//! [`DiagramStore`] owns the node sequence, the edge sequence and the
//! viewport. It is the only place they are mutated; everything else reads
//! through accessors or goes through the editor.

use std::collections::HashSet;

use log::{debug, warn};

use flowpad_core::{
    edge::{Connection, Edge},
    node::Node,
    snapshot::Snapshot,
    viewport::Viewport,
};

use crate::changes::{EdgeChange, NodeChange, apply_edge_changes, apply_node_changes};

/// Nodes, edges and viewport of one diagram.
#[derive(Debug, Clone, Default)]
pub struct DiagramStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    viewport: Viewport,
    /// Edges whose reconnect gesture has started and not yet succeeded.
    pending_reconnects: HashSet<String>,
}

impl DiagramStore {
    pub fn new() -> Self {
        Self::default()
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

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id() == id)
    }

    fn has_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Captures the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.nodes.clone(), self.edges.clone(), self.viewport)
    }

    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        let nodes = std::mem::take(&mut self.nodes);
        self.nodes = apply_node_changes(changes, nodes);
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        let edges = std::mem::take(&mut self.edges);
        self.edges = apply_edge_changes(changes, edges);
    }

    /// Adds an edge for `connection`.
    ///
    /// Returns the id of the new edge, or `None` when an endpoint is missing
    /// or an edge joining the same endpoints and handles already exists.
    pub fn connect(&mut self, connection: &Connection) -> Option<String> {
        if !self.has_node(&connection.source) || !self.has_node(&connection.target) {
            warn!(
                source = connection.source.as_str(),
                target = connection.target.as_str();
                "Invalid connection: endpoint does not exist"
            );
            return None;
        }

        if self.edges.iter().any(|edge| edge.matches(connection)) {
            debug!(
                source = connection.source.as_str(),
                target = connection.target.as_str();
                "Connection already exists"
            );
            return None;
        }

        let edge = Edge::from_connection(connection);
        let id = edge.id().to_string();
        debug!(id = id.as_str(); "Edge connected");
        self.edges.push(edge);
        Some(id)
    }

    /// Marks the start of a reconnect gesture on `edge_id`.
    pub fn begin_reconnect(&mut self, edge_id: &str) {
        if self.edge(edge_id).is_some() {
            self.pending_reconnects.insert(edge_id.to_string());
        }
    }

    /// Moves the endpoints of `edge_id` to those of `connection`, keeping its
    /// id and position in the sequence.
    ///
    /// Returns false, changing nothing, when the edge is unknown or an
    /// endpoint is missing.
    pub fn reconnect_edge(&mut self, edge_id: &str, connection: &Connection) -> bool {
        if !self.has_node(&connection.source) || !self.has_node(&connection.target) {
            warn!(
                edge = edge_id,
                source = connection.source.as_str(),
                target = connection.target.as_str();
                "Invalid reconnection: endpoint does not exist"
            );
            return false;
        }

        let Some(edge) = self.edges.iter_mut().find(|edge| edge.id() == edge_id) else {
            return false;
        };

        edge.set_endpoints(connection);
        self.pending_reconnects.remove(edge_id);
        debug!(edge = edge_id; "Edge reconnected");
        true
    }

    /// Ends a reconnect gesture. An edge whose gesture never succeeded was
    /// dragged off its handle and is removed.
    ///
    /// Returns true if the edge was removed.
    pub fn end_reconnect(&mut self, edge_id: &str) -> bool {
        if !self.pending_reconnects.remove(edge_id) {
            return false;
        }

        let before = self.edges.len();
        self.edges.retain(|edge| edge.id() != edge_id);
        let removed = self.edges.len() != before;
        if removed {
            debug!(edge = edge_id; "Edge removed by abandoned reconnect");
        }
        removed
    }

    pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
    }

    pub fn replace_edges(&mut self, edges: Vec<Edge>) {
        self.pending_reconnects.clear();
        self.edges = edges;
    }

    /// Swaps both sequences at once.
    pub fn replace_graph(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.replace_nodes(nodes);
        self.replace_edges(edges);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
    }
}

#[cfg(test)]
mod tests {
    use flowpad_core::node::NodeKind;

    use super::*;

    fn store_with_nodes(ids: &[&str]) -> DiagramStore {
        let mut store = DiagramStore::new();
        store.replace_nodes(
            ids.iter()
                .map(|id| Node::new(*id, NodeKind::Default, *id))
                .collect(),
        );
        store
    }

    #[test]
    fn test_connect_appends_one_edge() {
        let mut store = store_with_nodes(&["a", "b"]);
        let id = store.connect(&Connection::new("a", "b"));

        assert_eq!(id.as_deref(), Some("reactflow__edge-a-b"));
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.edges()[0].source(), "a");
        assert_eq!(store.edges()[0].target(), "b");
    }

    #[test]
    fn test_connect_with_handles_builds_id() {
        let mut store = store_with_nodes(&["a", "b"]);
        let id = store.connect(&Connection::new("a", "b").with_handles("s", "t"));
        assert_eq!(id.as_deref(), Some("reactflow__edge-as-bt"));
    }

    #[test]
    fn test_connect_missing_endpoint_is_noop() {
        let mut store = store_with_nodes(&["a"]);
        assert_eq!(store.connect(&Connection::new("a", "ghost")), None);
        assert_eq!(store.connect(&Connection::new("ghost", "a")), None);
        assert!(store.edges().is_empty());
    }

    #[test]
    fn test_connect_duplicate_is_noop() {
        let mut store = store_with_nodes(&["a", "b"]);
        store.connect(&Connection::new("a", "b"));
        assert_eq!(store.connect(&Connection::new("a", "b")), None);
        assert_eq!(store.edges().len(), 1);
    }

    #[test]
    fn test_reconnect_keeps_id_and_order() {
        let mut store = store_with_nodes(&["a", "b", "c"]);
        store.replace_edges(vec![Edge::new("e1", "a", "b"), Edge::new("e2", "b", "c")]);

        assert!(store.reconnect_edge("e1", &Connection::new("a", "c")));

        assert_eq!(store.edges()[0].id(), "e1");
        assert_eq!(store.edges()[0].target(), "c");
        assert_eq!(store.edges()[1].id(), "e2");
    }

    #[test]
    fn test_reconnect_to_missing_node_is_rejected() {
        let mut store = store_with_nodes(&["a", "b"]);
        store.replace_edges(vec![Edge::new("e1", "a", "b")]);

        assert!(!store.reconnect_edge("e1", &Connection::new("a", "ghost")));
        assert_eq!(store.edges()[0].target(), "b");
    }

    #[test]
    fn test_abandoned_reconnect_removes_edge() {
        let mut store = store_with_nodes(&["a", "b"]);
        store.replace_edges(vec![Edge::new("e1", "a", "b")]);

        store.begin_reconnect("e1");
        assert!(store.end_reconnect("e1"));
        assert!(store.edges().is_empty());
    }

    #[test]
    fn test_completed_reconnect_keeps_edge() {
        let mut store = store_with_nodes(&["a", "b", "c"]);
        store.replace_edges(vec![Edge::new("e1", "a", "b")]);

        store.begin_reconnect("e1");
        assert!(store.reconnect_edge("e1", &Connection::new("a", "c")));
        assert!(!store.end_reconnect("e1"));
        assert_eq!(store.edges().len(), 1);
    }

    #[test]
    fn test_end_without_begin_is_noop() {
        let mut store = store_with_nodes(&["a", "b"]);
        store.replace_edges(vec![Edge::new("e1", "a", "b")]);
        assert!(!store.end_reconnect("e1"));
        assert_eq!(store.edges().len(), 1);
    }

    #[test]
    fn test_replace_graph_and_snapshot() {
        let mut store = DiagramStore::new();
        store.replace_graph(
            vec![Node::new("x", NodeKind::Input, "x")],
            vec![Edge::new("e", "x", "x")],
        );
        store.set_viewport(Viewport::new(5.0, 6.0, 2.0));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.nodes().len(), 1);
        assert_eq!(snapshot.edges().len(), 1);
        assert_eq!(snapshot.viewport(), Viewport::new(5.0, 6.0, 2.0));
    }
}
