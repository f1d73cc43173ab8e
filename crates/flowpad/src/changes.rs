//! Incremental changes to the node and edge sequences.
//!
//! Gestures on the canvas (dragging, resizing, selecting, deleting) arrive
//! as lists of changes. [`apply_node_changes`] and [`apply_edge_changes`]
//! fold them into a new sequence without touching anything else:
//!
//! - elements that no change names keep their relative order,
//! - added elements are appended in the order they were listed,
//! - changes naming an unknown id are ignored.

use std::collections::HashSet;

use log::trace;

use flowpad_core::{
    edge::Edge,
    geometry::{Point, Size},
    node::Node,
};

/// A change to one node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// The node was dragged. `position` is `None` when a drag ends without
    /// a final move.
    Position {
        id: String,
        position: Option<Point>,
        dragging: bool,
    },
    /// The node was measured or resized.
    Dimensions { id: String, size: Size },
    Select { id: String, selected: bool },
    Remove { id: String },
    Add { item: Node },
}

/// A change to one edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Select { id: String, selected: bool },
    Remove { id: String },
    Add { item: Edge },
}

impl NodeChange {
    /// True for changes that add or remove a node.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Remove { .. } | Self::Add { .. })
    }
}

impl EdgeChange {
    /// True for changes that add or remove an edge.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Remove { .. } | Self::Add { .. })
    }
}

/// Applies `changes` to `nodes` and returns the resulting sequence.
pub fn apply_node_changes(changes: &[NodeChange], nodes: Vec<Node>) -> Vec<Node> {
    let mut removed = HashSet::new();
    let mut added = Vec::new();
    let mut nodes = nodes;

    for change in changes {
        match change {
            NodeChange::Position {
                id,
                position,
                dragging,
            } => {
                if let Some(node) = nodes.iter_mut().find(|node| node.id() == id) {
                    if let Some(position) = position {
                        node.set_position(*position);
                    }
                    node.set_dragging(*dragging);
                }
            }
            NodeChange::Dimensions { id, size } => {
                if let Some(node) = nodes.iter_mut().find(|node| node.id() == id) {
                    node.set_size(*size);
                }
            }
            NodeChange::Select { id, selected } => {
                if let Some(node) = nodes.iter_mut().find(|node| node.id() == id) {
                    node.set_selected(*selected);
                }
            }
            NodeChange::Remove { id } => {
                removed.insert(id.as_str());
            }
            NodeChange::Add { item } => added.push(item.clone()),
        }
    }

    trace!(
        changes = changes.len(),
        removed = removed.len(),
        added = added.len();
        "Applying node changes"
    );

    nodes.retain(|node| !removed.contains(node.id()));
    nodes.extend(added);
    nodes
}

/// Applies `changes` to `edges` and returns the resulting sequence.
pub fn apply_edge_changes(changes: &[EdgeChange], edges: Vec<Edge>) -> Vec<Edge> {
    let mut removed = HashSet::new();
    let mut added = Vec::new();
    let mut edges = edges;

    for change in changes {
        match change {
            EdgeChange::Select { id, selected } => {
                if let Some(edge) = edges.iter_mut().find(|edge| edge.id() == id) {
                    edge.set_selected(*selected);
                }
            }
            EdgeChange::Remove { id } => {
                removed.insert(id.as_str());
            }
            EdgeChange::Add { item } => added.push(item.clone()),
        }
    }

    trace!(
        changes = changes.len(),
        removed = removed.len(),
        added = added.len();
        "Applying edge changes"
    );

    edges.retain(|edge| !removed.contains(edge.id()));
    edges.extend(added);
    edges
}

#[cfg(test)]
mod tests {
    use flowpad_core::node::NodeKind;
    use proptest::prelude::*;

    use super::*;

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .map(|id| Node::new(*id, NodeKind::Default, *id))
            .collect()
    }

    fn ids(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(Node::id).collect()
    }

    #[test]
    fn test_position_change_moves_only_named_node() {
        let result = apply_node_changes(
            &[NodeChange::Position {
                id: "b".into(),
                position: Some(Point::new(10.0, 20.0)),
                dragging: true,
            }],
            nodes(&["a", "b", "c"]),
        );

        assert_eq!(ids(&result), ["a", "b", "c"]);
        assert_eq!(result[1].position(), Point::new(10.0, 20.0));
        assert!(result[1].is_dragging());
        assert_eq!(result[0].position(), Point::default());
    }

    #[test]
    fn test_drag_end_without_position_keeps_last_position() {
        let start = apply_node_changes(
            &[NodeChange::Position {
                id: "a".into(),
                position: Some(Point::new(5.0, 5.0)),
                dragging: true,
            }],
            nodes(&["a"]),
        );
        let end = apply_node_changes(
            &[NodeChange::Position {
                id: "a".into(),
                position: None,
                dragging: false,
            }],
            start,
        );

        assert_eq!(end[0].position(), Point::new(5.0, 5.0));
        assert!(!end[0].is_dragging());
    }

    #[test]
    fn test_dimensions_and_selection() {
        let result = apply_node_changes(
            &[
                NodeChange::Dimensions {
                    id: "a".into(),
                    size: Size::new(150.0, 40.0),
                },
                NodeChange::Select {
                    id: "a".into(),
                    selected: true,
                },
            ],
            nodes(&["a"]),
        );

        assert_eq!(result[0].size(), Some(Size::new(150.0, 40.0)));
        assert!(result[0].is_selected());
    }

    #[test]
    fn test_remove_and_add() {
        let result = apply_node_changes(
            &[
                NodeChange::Add {
                    item: Node::new("d", NodeKind::Output, "d"),
                },
                NodeChange::Remove { id: "b".into() },
            ],
            nodes(&["a", "b", "c"]),
        );

        assert_eq!(ids(&result), ["a", "c", "d"]);
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let before = nodes(&["a", "b"]);
        let result = apply_node_changes(
            &[
                NodeChange::Remove { id: "zz".into() },
                NodeChange::Select {
                    id: "zz".into(),
                    selected: true,
                },
            ],
            before.clone(),
        );
        assert_eq!(result, before);
    }

    #[test]
    fn test_edge_changes() {
        let edges = vec![
            Edge::new("e1", "a", "b"),
            Edge::new("e2", "b", "c"),
            Edge::new("e3", "c", "a"),
        ];
        let result = apply_edge_changes(
            &[
                EdgeChange::Select {
                    id: "e3".into(),
                    selected: true,
                },
                EdgeChange::Remove { id: "e1".into() },
                EdgeChange::Add {
                    item: Edge::new("e4", "a", "c"),
                },
            ],
            edges,
        );

        let ids: Vec<&str> = result.iter().map(Edge::id).collect();
        assert_eq!(ids, ["e2", "e3", "e4"]);
        assert!(result[1].is_selected());
    }

    proptest! {
        #[test]
        fn removal_preserves_relative_order(
            count in 1usize..20,
            remove in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
        ) {
            let names: Vec<String> = (0..count).map(|i| format!("n{i}")).collect();
            let before: Vec<Node> = names
                .iter()
                .map(|id| Node::new(id.as_str(), NodeKind::Default, id.as_str()))
                .collect();
            let changes: Vec<NodeChange> = remove
                .iter()
                .map(|index| NodeChange::Remove { id: names[index.index(count)].clone() })
                .collect();

            let after = apply_node_changes(&changes, before.clone());

            let expected: Vec<&str> = before
                .iter()
                .map(Node::id)
                .filter(|id| !changes.contains(&NodeChange::Remove { id: id.to_string() }))
                .collect();
            prop_assert_eq!(ids(&after), expected);
        }
    }
}
