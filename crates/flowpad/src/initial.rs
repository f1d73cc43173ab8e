//! The diagram shown before anything is imported or restored.

use serde_json::json;

use flowpad_core::{
    edge::{Edge, Marker, MarkerKind},
    node::{Node, NodeKind},
    style::Style,
};

/// Nodes `1` (input), `2` (default) and `3` (output), all at the origin.
pub fn default_nodes() -> Vec<Node> {
    vec![
        Node::new("1", NodeKind::Input, "1sdfsdfsw wefwfwf wfwcsdcwecccsdc").with_style(
            Style::from([
                ("backgroundColor".to_string(), json!("red")),
                ("color".to_string(), json!("white")),
            ]),
        ),
        Node::new("2", NodeKind::Default, "2"),
        Node::new("3", NodeKind::Output, "3"),
    ]
}

/// Edges `e1-2` and `e2-3`, both drawn as floating edges with an arrow.
pub fn default_edges() -> Vec<Edge> {
    vec![
        Edge::new("e1-2", "1", "2")
            .with_label("1 to 2")
            .with_variant("floating")
            .with_animated(true)
            .with_style(Style::from([
                ("strokeWidth".to_string(), json!(2)),
                ("stroke".to_string(), json!("#FF0072")),
            ]))
            .with_marker_end(Marker::new(MarkerKind::Arrow)),
        Edge::new("e2-3", "2", "3")
            .with_label("2 to 3")
            .with_variant("floating")
            .with_marker_end(Marker::new(MarkerKind::Arrow)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_graph_is_connected() {
        let nodes = default_nodes();
        let edges = default_edges();

        let ids: Vec<&str> = nodes.iter().map(Node::id).collect();
        assert_eq!(ids, ["1", "2", "3"]);

        for edge in &edges {
            assert!(ids.contains(&edge.source()));
            assert!(ids.contains(&edge.target()));
        }
        assert!(edges[0].is_animated());
        assert!(!edges[1].is_animated());
    }
}
