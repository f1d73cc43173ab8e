//! SVG rendering of a [`Snapshot`].
//!
//! The output is a static picture of the diagram: node boxes with their
//! labels, straight edges between handle points, edge labels and arrow
//! markers. The viewport is ignored; the picture always frames every node.

use std::{collections::BTreeMap, path::Path};

use log::{debug, info};
use svg::{
    Document,
    node::element::{self as svg_element, Definitions, Marker, Path as SvgPath},
};

use flowpad_core::{
    color::Color,
    edge::{Edge, MarkerKind},
    geometry::{Bounds, Point, Size},
    node::{HandlePosition, Node, NodeKind},
    snapshot::Snapshot,
    style::{color_property, number_property},
};

use crate::{config::StyleConfig, export::ExportError};

const DEFAULT_EDGE_COLOR: &str = "#b1b1b7";
const NODE_BORDER_COLOR: &str = "#1a192b";
const LABEL_COLOR: &str = "#222222";
const FONT_FAMILY: &str = "sans-serif";
const FONT_SIZE: f32 = 12.0;

/// Renders snapshots to SVG documents.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    background: Option<Color>,
    /// Size used for nodes that were never measured or laid out.
    fallback_size: Size,
    margin: f32,
}

impl Default for SvgExporter {
    fn default() -> Self {
        Self {
            background: None,
            fallback_size: Size::new(150.0, 50.0),
            margin: 20.0,
        }
    }
}

impl SvgExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the background color from `style`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidColor`] if the configured color is invalid.
    pub fn with_style(mut self, style: &StyleConfig) -> Result<Self, ExportError> {
        self.background = style.background_color()?;
        Ok(self)
    }

    pub fn with_fallback_size(mut self, size: Size) -> Self {
        self.fallback_size = size;
        self
    }

    /// Builds the SVG document for `snapshot`.
    pub fn render(&self, snapshot: &Snapshot) -> Document {
        let bounds = snapshot
            .nodes()
            .iter()
            .map(|node| node.bounds(self.fallback_size))
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_else(|| {
                Bounds::new_from_top_left(Point::default(), Size::new(100.0, 100.0))
            })
            .expand(self.margin);

        let mut document = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    bounds.min_x(),
                    bounds.min_y(),
                    bounds.width(),
                    bounds.height()
                ),
            )
            .set("width", bounds.width())
            .set("height", bounds.height());

        if let Some(background) = &self.background {
            document = document.add(
                svg_element::Rectangle::new()
                    .set("x", bounds.min_x())
                    .set("y", bounds.min_y())
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("fill", background)
                    .set("fill-opacity", background.alpha()),
            );
        }

        let markers = self.marker_colors(snapshot.edges());
        if !markers.is_empty() {
            document = document.add(marker_definitions(&markers));
        }

        for edge in snapshot.edges() {
            if let Some(group) = self.render_edge(edge, snapshot.nodes()) {
                document = document.add(group);
            }
        }

        for node in snapshot.nodes() {
            document = document.add(self.render_node(node));
        }

        debug!(
            nodes = snapshot.nodes().len(),
            edges = snapshot.edges().len();
            "SVG document built"
        );
        document
    }

    /// Renders `snapshot` to a string.
    pub fn render_to_string(&self, snapshot: &Snapshot) -> String {
        self.render(snapshot).to_string()
    }

    /// Renders `snapshot` and writes it to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be written.
    pub fn export_to(
        &self,
        snapshot: &Snapshot,
        path: impl AsRef<Path>,
    ) -> Result<(), ExportError> {
        let path = path.as_ref();
        svg::save(path, &self.render(snapshot))?;
        info!(path:? = path; "SVG exported");
        Ok(())
    }

    /// Distinct stroke colors of edges that end in a marker, keyed by marker id.
    fn marker_colors(&self, edges: &[Edge]) -> BTreeMap<String, (MarkerKind, Color)> {
        edges
            .iter()
            .filter_map(|edge| {
                let marker = edge.marker_end()?;
                let color = marker
                    .color()
                    .and_then(|color| Color::new(color).ok())
                    .unwrap_or_else(|| edge_color(edge));
                Some((marker_id(marker.kind(), color), (marker.kind(), color)))
            })
            .collect()
    }

    fn render_edge(&self, edge: &Edge, nodes: &[Node]) -> Option<svg_element::Group> {
        let source = nodes.iter().find(|node| node.id() == edge.source())?;
        let target = nodes.iter().find(|node| node.id() == edge.target())?;

        let start = handle_point(
            source.bounds(self.fallback_size),
            source.source_position().unwrap_or(HandlePosition::Bottom),
        );
        let end = handle_point(
            target.bounds(self.fallback_size),
            target.target_position().unwrap_or(HandlePosition::Top),
        );

        let color = edge_color(edge);
        let mut path = SvgPath::new()
            .set(
                "d",
                format!("M {} {} L {} {}", start.x(), start.y(), end.x(), end.y()),
            )
            .set("fill", "none")
            .set("stroke", &color)
            .set(
                "stroke-width",
                number_property(edge.style(), "strokeWidth").unwrap_or(1.0),
            );

        if edge.is_animated() {
            path = path.set("stroke-dasharray", "5 5");
        }
        if let Some(marker) = edge.marker_end() {
            let color = marker
                .color()
                .and_then(|color| Color::new(color).ok())
                .unwrap_or(color);
            path = path.set(
                "marker-end",
                format!("url(#{})", marker_id(marker.kind(), color)),
            );
        }

        let mut group = svg_element::Group::new()
            .set("class", "edge")
            .set("data-id", edge.id())
            .add(path);

        if let Some(label) = edge.label().filter(|label| !label.is_empty()) {
            let middle = start.midpoint(end);
            group = group.add(
                svg_element::Text::new(label)
                    .set("x", middle.x())
                    .set("y", middle.y())
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "middle")
                    .set("font-family", FONT_FAMILY)
                    .set("font-size", FONT_SIZE - 2.0)
                    .set("fill", LABEL_COLOR),
            );
        }

        Some(group)
    }

    fn render_node(&self, node: &Node) -> svg_element::Group {
        let bounds = node.bounds(self.fallback_size);
        let style = node.style();

        let mut rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", 3)
            .set("stroke", NODE_BORDER_COLOR)
            .set("stroke-width", if node.is_selected() { 2 } else { 1 });

        let fill = color_property(style, "backgroundColor").or_else(|| node.kind().minimap_color());
        rect = match fill {
            Some(fill) => rect.set("fill", &fill).set("fill-opacity", fill.alpha()),
            None if *node.kind() == NodeKind::Group => rect.set("fill", "none"),
            None => rect.set("fill", "white"),
        };

        let text_color = color_property(style, "color")
            .map(|color| color.to_string())
            .unwrap_or_else(|| LABEL_COLOR.to_string());
        let center = bounds.center();
        let text = svg_element::Text::new(node.label())
            .set("x", center.x())
            .set("y", center.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-family", FONT_FAMILY)
            .set("font-size", FONT_SIZE)
            .set("fill", text_color);

        svg_element::Group::new()
            .set("class", format!("node node-{}", node.kind().name()))
            .set("data-id", node.id())
            .add(rect)
            .add(text)
    }
}

fn edge_color(edge: &Edge) -> Color {
    color_property(edge.style(), "stroke")
        .or_else(|| Color::new(DEFAULT_EDGE_COLOR).ok())
        .unwrap_or_default()
}

fn marker_id(kind: MarkerKind, color: Color) -> String {
    let kind = match kind {
        MarkerKind::Arrow => "arrow",
        MarkerKind::ArrowClosed => "arrowclosed",
    };
    format!("marker-{kind}-{}", color.marker_key())
}

/// Midpoint of the side of `bounds` named by `position`.
fn handle_point(bounds: Bounds, position: HandlePosition) -> Point {
    let center = bounds.center();
    match position {
        HandlePosition::Top => center.with_y(bounds.min_y()),
        HandlePosition::Bottom => center.with_y(bounds.max_y()),
        HandlePosition::Left => center.with_x(bounds.min_x()),
        HandlePosition::Right => center.with_x(bounds.max_x()),
    }
}

fn marker_definitions(markers: &BTreeMap<String, (MarkerKind, Color)>) -> Definitions {
    let mut defs = Definitions::new();

    for (id, (kind, color)) in markers {
        let shape = match kind {
            MarkerKind::Arrow => SvgPath::new()
                .set("d", "M 0 0 L 10 5 L 0 10")
                .set("fill", "none")
                .set("stroke", color)
                .set("stroke-width", 1.5),
            MarkerKind::ArrowClosed => SvgPath::new()
                .set("d", "M 0 0 L 10 5 L 0 10 z")
                .set("fill", color),
        };

        defs = defs.add(
            Marker::new()
                .set("id", id.as_str())
                .set("viewBox", "0 0 10 10")
                .set("refX", 9)
                .set("refY", 5)
                .set("markerWidth", 6)
                .set("markerHeight", 6)
                .set("orient", "auto")
                .add(shape),
        );
    }

    defs
}

#[cfg(test)]
mod tests {
    use flowpad_core::{edge::Marker, style::Style, viewport::Viewport};
    use serde_json::json;

    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                Node::new("a", NodeKind::Input, "Start")
                    .with_style(Style::from([("backgroundColor".to_string(), json!("#ff0000"))])),
                Node::new("b", NodeKind::Output, "End").with_position(Point::new(0.0, 150.0)),
            ],
            vec![
                Edge::new("e", "a", "b")
                    .with_label("a to b")
                    .with_animated(true)
                    .with_marker_end(Marker::new(MarkerKind::Arrow)),
                Edge::new("dangling", "a", "zz"),
            ],
            Viewport::default(),
        )
    }

    #[test]
    fn test_render_contains_nodes_and_edges() {
        let output = SvgExporter::new().render_to_string(&snapshot());

        assert!(output.contains("<svg"));
        assert!(output.contains("Start"));
        assert!(output.contains("End"));
        assert!(output.contains("a to b"));
        assert!(output.contains("stroke-dasharray"));
        assert!(output.contains("marker-end"));
        assert!(!output.contains("data-id=\"dangling\""));
    }

    #[test]
    fn test_unknown_kind_is_drawn_unstyled() {
        let custom = Snapshot::new(
            vec![Node::new("c", NodeKind::Other("custom".into()), "Custom")],
            Vec::new(),
            Viewport::default(),
        );
        let output = SvgExporter::new().render_to_string(&custom);

        assert!(output.contains("node-custom"));
        assert!(output.contains("fill=\"white\""));
    }

    #[test]
    fn test_empty_snapshot_renders() {
        let output = SvgExporter::new().render_to_string(&Snapshot::default());
        assert!(output.contains("viewBox"));
    }

    #[test]
    fn test_handle_points() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 40.0));
        assert_eq!(handle_point(bounds, HandlePosition::Top), Point::new(50.0, 0.0));
        assert_eq!(handle_point(bounds, HandlePosition::Bottom), Point::new(50.0, 40.0));
        assert_eq!(handle_point(bounds, HandlePosition::Left), Point::new(0.0, 20.0));
        assert_eq!(handle_point(bounds, HandlePosition::Right), Point::new(100.0, 20.0));
    }

    #[test]
    fn test_invalid_background_is_rejected() {
        let style = StyleConfig::new(Some("nope".to_string()));
        assert!(SvgExporter::new().with_style(&style).is_err());
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        SvgExporter::new().export_to(&snapshot(), &path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("<svg"));
    }
}
