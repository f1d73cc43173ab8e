//! Static Sankey charts.
//!
//! A Sankey document describes flows between labelled nodes the way
//! charting libraries take them: parallel arrays of node labels and
//! positions, and parallel arrays of link sources, targets and values.
//!
//! ```text
//! {
//!   title: "Sankey with manually positioned node",
//!   node: { label: ["a", "b", "c"], x: [0.1, 0.9, 0.9], y: [0.5, 0.3, 0.7], pad: 10 },
//!   link: { source: [0, 0], target: [1, 2], value: [2, 1] },
//! }
//! ```
//!
//! The document may also be an array of such traces; the first one is
//! drawn. Node `x` and `y` are fractions of the drawing area, clamped into
//! `0..=1`, giving the left edge and the vertical center of the node bar.
//! Nodes without an `x` are placed by depth: sources in the first column
//! and every target one column past its furthest source. Nodes without a
//! `y` are stacked in the middle of their column. A bar's
//! height is proportional to the larger of its inflow and outflow, and
//! nodes that carry no flow are not drawn.

use std::{collections::BTreeMap, fs, path::Path};

use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use svg::{
    Document,
    node::element::{self as svg_element, Path as SvgPath},
};
use thiserror::Error;

use flowpad_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
};

use crate::{config::StyleConfig, error::FlowpadError, export::ExportError, import};

/// Fill colors cycled through for nodes without their own color.
const NODE_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];
const DEFAULT_LINK_COLOR: &str = "rgba(0, 0, 0, 0.2)";
const LABEL_COLOR: &str = "#222222";
const FONT_FAMILY: &str = "sans-serif";
const FONT_SIZE: f32 = 12.0;
const TITLE_HEIGHT: f32 = 30.0;
/// Gap between a node bar and its label.
const LABEL_GAP: f32 = 6.0;
/// Smallest share of the drawing height a column keeps for its bars when
/// padding alone would fill it.
const MIN_COLUMN_FILL: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SankeyError {
    #[error("document holds no Sankey trace")]
    Empty,

    #[error(
        "link arrays differ in length: {sources} sources, {targets} targets, {values} values"
    )]
    LinkLengthMismatch {
        sources: usize,
        targets: usize,
        values: usize,
    },

    #[error("link {link} refers to node {node}, but only {count} nodes are declared")]
    UnknownNode {
        link: usize,
        node: usize,
        count: usize,
    },

    #[error("link {link} has value {value}; values must be finite and not negative")]
    InvalidValue { link: usize, value: f32 },

    #[error("node {node} has a position that is not a finite number")]
    InvalidPosition { node: usize },

    #[error("`{0}` must be a finite number that is not negative")]
    InvalidSpacing(&'static str),
}

/// A single color for every element, or one per element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    All(String),
    Each(Vec<String>),
}

impl ColorSpec {
    fn for_index(&self, index: usize) -> Option<&str> {
        match self {
            Self::All(color) => Some(color),
            Self::Each(colors) => colors.get(index).map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SankeyNodes {
    label: Vec<String>,
    x: Vec<f32>,
    y: Vec<f32>,
    /// Vertical gap between bars in one column, in pixels.
    pad: f32,
    /// Bar width in pixels.
    thickness: f32,
    color: Option<ColorSpec>,
}

impl Default for SankeyNodes {
    fn default() -> Self {
        Self {
            label: Vec::new(),
            x: Vec::new(),
            y: Vec::new(),
            pad: 10.0,
            thickness: 20.0,
            color: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SankeyLinks {
    source: Vec<usize>,
    target: Vec<usize>,
    value: Vec<f32>,
    color: Option<ColorSpec>,
}

/// One Sankey trace. Unknown keys such as `type` or `arrangement` are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SankeyDiagram {
    title: Option<String>,
    node: SankeyNodes,
    link: SankeyLinks,
}

/// A link that carries flow, with its endpoints resolved.
#[derive(Debug, Clone, Copy)]
struct Flow {
    link: usize,
    source: usize,
    target: usize,
    value: f32,
}

impl Flow {
    /// The node at `end` and the node at the other end.
    fn ends(&self, end: LinkEnd) -> (usize, usize) {
        match end {
            LinkEnd::Source => (self.source, self.target),
            LinkEnd::Target => (self.target, self.source),
        }
    }
}

impl SankeyDiagram {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Nodes declared by the longest of the label and position arrays.
    pub fn node_count(&self) -> usize {
        self.node
            .label
            .len()
            .max(self.node.x.len())
            .max(self.node.y.len())
    }

    pub fn link_count(&self) -> usize {
        self.link.value.len()
    }

    pub fn label(&self, node: usize) -> &str {
        self.node.label.get(node).map_or("", String::as_str)
    }

    /// Checks the shape of the document before anything is drawn.
    ///
    /// # Errors
    ///
    /// Returns the first [`SankeyError`] found.
    pub fn validate(&self) -> Result<(), SankeyError> {
        let links = &self.link;
        if links.source.len() != links.target.len() || links.source.len() != links.value.len() {
            return Err(SankeyError::LinkLengthMismatch {
                sources: links.source.len(),
                targets: links.target.len(),
                values: links.value.len(),
            });
        }

        let count = self.node_count();
        for (link, (&source, &target)) in links.source.iter().zip(&links.target).enumerate() {
            if let Some(node) = [source, target].into_iter().find(|&node| node >= count) {
                return Err(SankeyError::UnknownNode { link, node, count });
            }
        }

        if let Some((link, &value)) = links
            .value
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite() || **value < 0.0)
        {
            return Err(SankeyError::InvalidValue { link, value });
        }

        let coordinates = self.node.x.iter().enumerate().chain(self.node.y.iter().enumerate());
        if let Some((node, _)) = coordinates.into_iter().find(|(_, c)| !c.is_finite()) {
            return Err(SankeyError::InvalidPosition { node });
        }

        for (field, value) in [("pad", self.node.pad), ("thickness", self.node.thickness)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SankeyError::InvalidSpacing(field));
            }
        }
        Ok(())
    }

    /// Links with a positive value. Assumes the diagram is valid.
    fn flows(&self) -> Vec<Flow> {
        let links = &self.link;
        links
            .source
            .iter()
            .zip(&links.target)
            .zip(&links.value)
            .enumerate()
            .filter(|(_, (_, value))| **value > 0.0)
            .map(|(link, ((&source, &target), &value))| Flow {
                link,
                source,
                target,
                value,
            })
            .collect()
    }
}

/// Parses a relaxed-JSON Sankey document.
///
/// # Errors
///
/// Returns [`FlowpadError::Parse`] for malformed text,
/// [`FlowpadError::Decode`] when a field has the wrong shape, and
/// [`FlowpadError::Export`] when the document fails
/// [`SankeyDiagram::validate`].
pub fn parse_sankey(source: &str) -> Result<SankeyDiagram, FlowpadError> {
    let trace = match import::parse_document::<Value>(source)? {
        Value::Array(traces) => traces
            .into_iter()
            .next()
            .ok_or(ExportError::from(SankeyError::Empty))?,
        other => other,
    };
    let diagram: SankeyDiagram = serde_json::from_value(trace)?;
    diagram.validate().map_err(ExportError::from)?;

    debug!(
        nodes = diagram.node_count(),
        links = diagram.link_count();
        "Decoded Sankey document"
    );
    Ok(diagram)
}

/// Reads and parses a Sankey document file.
pub fn read_sankey(path: impl AsRef<Path>) -> Result<SankeyDiagram, FlowpadError> {
    let path = path.as_ref();
    info!(path:? = path; "Reading Sankey document");
    parse_sankey(&fs::read_to_string(path)?)
}

/// A link drawn as a band of constant width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkBand {
    /// Index of the link in the document.
    pub link: usize,
    /// Middle of the band where it leaves its source bar.
    pub start: Point,
    /// Middle of the band where it enters its target bar.
    pub end: Point,
    pub width: f32,
}

/// Placed geometry of a Sankey chart, in SVG user units.
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLayout {
    /// One entry per declared node; `None` for nodes without flow.
    bars: Vec<Option<Bounds>>,
    bands: Vec<LinkBand>,
}

impl SankeyLayout {
    pub fn bars(&self) -> &[Option<Bounds>] {
        &self.bars
    }

    pub fn bands(&self) -> &[LinkBand] {
        &self.bands
    }
}

/// Which end of its links a node's bands are stacked at.
#[derive(Debug, Clone, Copy)]
enum LinkEnd {
    Source,
    Target,
}

/// Renders Sankey diagrams to SVG documents.
#[derive(Debug, Clone)]
pub struct SankeyRenderer {
    size: Size,
    margin: f32,
    background: Option<Color>,
}

impl Default for SankeyRenderer {
    fn default() -> Self {
        Self {
            size: Size::new(900.0, 500.0),
            margin: 20.0,
            background: None,
        }
    }
}

impl SankeyRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
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

    /// The rectangle bars and bands are drawn in.
    fn drawing_area(&self, diagram: &SankeyDiagram) -> Bounds {
        let title = if diagram.title().is_some() {
            TITLE_HEIGHT
        } else {
            0.0
        };
        Bounds::new_from_top_left(
            Point::new(self.margin, self.margin + title),
            Size::new(
                (self.size.width() - 2.0 * self.margin).max(1.0),
                (self.size.height() - 2.0 * self.margin - title).max(1.0),
            ),
        )
    }

    /// Places every bar and band of `diagram`.
    ///
    /// Bars in one column share a scale: the fullest column, counting its
    /// padding, fills the drawing height.
    ///
    /// # Errors
    ///
    /// Returns the [`SankeyError`] from [`SankeyDiagram::validate`].
    pub fn arrange(&self, diagram: &SankeyDiagram) -> Result<SankeyLayout, SankeyError> {
        diagram.validate()?;
        let count = diagram.node_count();
        let nodes = &diagram.node;
        let flows = diagram.flows();

        let mut inflow = vec![0.0_f32; count];
        let mut outflow = vec![0.0_f32; count];
        for flow in &flows {
            outflow[flow.source] += flow.value;
            inflow[flow.target] += flow.value;
        }
        let throughput: Vec<f32> = inflow.iter().zip(&outflow).map(|(i, o)| i.max(*o)).collect();
        let visible = |node: usize| throughput[node] > 0.0;

        let depth = depths(count, &flows);
        let max_depth = depth.iter().copied().max().unwrap_or(0);
        let column_x: Vec<f32> = (0..count)
            .map(|node| match nodes.x.get(node) {
                Some(x) => x.clamp(0.0, 1.0),
                None if max_depth == 0 => 0.0,
                None => depth[node] as f32 / max_depth as f32,
            })
            .collect();

        let mut columns: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for node in (0..count).filter(|&node| visible(node)) {
            columns.entry(column_key(column_x[node])).or_default().push(node);
        }

        let area = self.drawing_area(diagram);
        let scale = columns
            .values()
            .map(|members| {
                let total: f32 = members.iter().map(|&node| throughput[node]).sum();
                let room = area.height() - nodes.pad * (members.len() - 1) as f32;
                room.max(area.height() * MIN_COLUMN_FILL) / total
            })
            .fold(f32::INFINITY, f32::min);
        if !scale.is_finite() {
            debug!("Sankey diagram carries no flow");
            return Ok(SankeyLayout {
                bars: vec![None; count],
                bands: Vec::new(),
            });
        }

        // Bars without a vertical position are stacked in the middle of
        // their column, in declaration order
        let mut stacked_top: Vec<Option<f32>> = vec![None; count];
        for members in columns.values() {
            let unplaced: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&node| nodes.y.get(node).is_none())
                .collect();
            let extent: f32 = unplaced.iter().map(|&node| throughput[node] * scale).sum::<f32>()
                + nodes.pad * unplaced.len().saturating_sub(1) as f32;
            let mut top = area.min_y() + ((area.height() - extent) / 2.0).max(0.0);
            for node in unplaced {
                stacked_top[node] = Some(top);
                top += throughput[node] * scale + nodes.pad;
            }
        }

        let thickness = nodes.thickness.min(area.width());
        let bars: Vec<Option<Bounds>> = (0..count)
            .map(|node| {
                visible(node).then(|| {
                    let height = throughput[node] * scale;
                    let left = area.min_x() + column_x[node] * (area.width() - thickness);
                    let top = match (stacked_top[node], nodes.y.get(node)) {
                        (Some(top), _) => top,
                        (None, Some(y)) => {
                            area.min_y() + y.clamp(0.0, 1.0) * area.height() - height / 2.0
                        }
                        (None, None) => area.min_y(),
                    }
                    .min(area.max_y() - height)
                    .max(area.min_y());
                    Bounds::new_from_top_left(Point::new(left, top), Size::new(thickness, height))
                })
            })
            .collect();

        let starts = stack_bands(&flows, &bars, scale, LinkEnd::Source);
        let ends = stack_bands(&flows, &bars, scale, LinkEnd::Target);
        let bands = flows
            .iter()
            .filter_map(|flow| {
                let from = bars[flow.source]?;
                let to = bars[flow.target]?;
                Some(LinkBand {
                    link: flow.link,
                    start: Point::new(from.max_x(), *starts.get(&flow.link)?),
                    end: Point::new(to.min_x(), *ends.get(&flow.link)?),
                    width: flow.value * scale,
                })
            })
            .collect();

        Ok(SankeyLayout { bars, bands })
    }

    /// Builds the SVG document for `diagram`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Sankey`] for an invalid diagram and
    /// [`ExportError::InvalidColor`] for a color that does not parse.
    pub fn render(&self, diagram: &SankeyDiagram) -> Result<Document, ExportError> {
        let layout = self.arrange(diagram)?;
        let (width, height) = (self.size.width(), self.size.height());

        let mut document = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height);

        if let Some(background) = &self.background {
            document = document.add(
                svg_element::Rectangle::new()
                    .set("width", width)
                    .set("height", height)
                    .set("fill", background)
                    .set("fill-opacity", background.alpha()),
            );
        }

        if let Some(title) = diagram.title() {
            document = document.add(
                svg_element::Text::new(title)
                    .set("x", width / 2.0)
                    .set("y", self.margin + TITLE_HEIGHT / 2.0)
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "middle")
                    .set("font-family", FONT_FAMILY)
                    .set("font-size", FONT_SIZE + 4.0)
                    .set("fill", LABEL_COLOR),
            );
        }

        for band in layout.bands() {
            let color = pick_color(diagram.link.color.as_ref(), band.link)?
                .map_or_else(|| Color::new(DEFAULT_LINK_COLOR), Ok)?;
            document = document.add(
                SvgPath::new()
                    .set("class", "sankey-link")
                    .set("data-link", band.link)
                    .set("d", band_path(band.start, band.end))
                    .set("fill", "none")
                    .set("stroke", &color)
                    .set("stroke-opacity", color.alpha())
                    .set("stroke-width", band.width),
            );
        }

        for (node, bar) in layout.bars().iter().enumerate() {
            let Some(bar) = bar else {
                continue;
            };
            let fill = match pick_color(diagram.node.color.as_ref(), node)? {
                Some(color) => color,
                None => Color::new(NODE_PALETTE[node % NODE_PALETTE.len()])?,
            };

            let mut group = svg_element::Group::new()
                .set("class", "sankey-node")
                .set("data-node", node)
                .add(
                    svg_element::Rectangle::new()
                        .set("x", bar.min_x())
                        .set("y", bar.min_y())
                        .set("width", bar.width())
                        .set("height", bar.height())
                        .set("fill", &fill)
                        .set("fill-opacity", fill.alpha())
                        .set("stroke", "#000000")
                        .set("stroke-width", 0.5),
                );

            let label = diagram.label(node).trim();
            if !label.is_empty() {
                // Labels face the middle of the chart
                let (x, anchor) = if bar.center().x() < width / 2.0 {
                    (bar.max_x() + LABEL_GAP, "start")
                } else {
                    (bar.min_x() - LABEL_GAP, "end")
                };
                group = group.add(
                    svg_element::Text::new(label)
                        .set("x", x)
                        .set("y", bar.center().y())
                        .set("text-anchor", anchor)
                        .set("dominant-baseline", "middle")
                        .set("font-family", FONT_FAMILY)
                        .set("font-size", FONT_SIZE)
                        .set("fill", LABEL_COLOR),
                );
            }
            document = document.add(group);
        }

        debug!(
            bars = layout.bars().iter().flatten().count(),
            bands = layout.bands().len();
            "Sankey document built"
        );
        Ok(document)
    }

    /// Renders `diagram` to a string.
    pub fn render_to_string(&self, diagram: &SankeyDiagram) -> Result<String, ExportError> {
        Ok(self.render(diagram)?.to_string())
    }

    /// Renders `diagram` and writes it to `path`.
    pub fn export_to(
        &self,
        diagram: &SankeyDiagram,
        path: impl AsRef<Path>,
    ) -> Result<(), ExportError> {
        let path = path.as_ref();
        svg::save(path, &self.render(diagram)?)?;
        info!(path:? = path; "Sankey chart exported");
        Ok(())
    }
}

/// Buckets column fractions so nearly equal positions share a column.
fn column_key(x: f32) -> i64 {
    (x * 1000.0).round() as i64
}

/// Column of each node when placed by depth. Every target sits at least one
/// column past each of its sources; on a cycle depths stop growing after
/// `count` rounds.
fn depths(count: usize, flows: &[Flow]) -> Vec<usize> {
    let mut depth = vec![0; count];
    for _ in 0..count {
        let mut changed = false;
        for flow in flows.iter().filter(|flow| flow.source != flow.target) {
            if depth[flow.target] <= depth[flow.source] {
                depth[flow.target] = depth[flow.source] + 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    depth
}

/// Vertical middle of each band at one end, keyed by link index.
///
/// Bands leave a source bar top to bottom in the order of their targets'
/// heights, and enter a target bar in the order of their sources' heights,
/// so bands sharing a bar do not cross there.
fn stack_bands(
    flows: &[Flow],
    bars: &[Option<Bounds>],
    scale: f32,
    end: LinkEnd,
) -> BTreeMap<usize, f32> {
    let height_of = |node: usize| bars[node].map_or(0.0, |bar| bar.center().y());

    let mut ordered: Vec<&Flow> = flows.iter().collect();
    ordered.sort_by(|a, b| {
        height_of(a.ends(end).1)
            .total_cmp(&height_of(b.ends(end).1))
            .then(a.link.cmp(&b.link))
    });

    let mut used = vec![0.0_f32; bars.len()];
    let mut middles = BTreeMap::new();
    for flow in ordered {
        let (node, _) = flow.ends(end);
        let width = flow.value * scale;
        if let Some(bar) = bars[node] {
            middles.insert(flow.link, bar.min_y() + used[node] + width / 2.0);
        }
        used[node] += width;
    }
    middles
}

fn pick_color(spec: Option<&ColorSpec>, index: usize) -> Result<Option<Color>, ExportError> {
    Ok(spec
        .and_then(|spec| spec.for_index(index))
        .map(Color::new)
        .transpose()?)
}

/// Cubic curve leaving and entering horizontally.
fn band_path(start: Point, end: Point) -> String {
    let middle = (start.x() + end.x()) / 2.0;
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        start.x(),
        start.y(),
        middle,
        start.y(),
        middle,
        end.y(),
        end.x(),
        end.y()
    )
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    const FORK: &str = r#"{
        title: 'Fork',
        node: { label: ['a', 'b', 'c'], pad: 10 },
        link: { source: [0, 0], target: [1, 2], value: [2, 1] },
    }"#;

    fn renderer() -> SankeyRenderer {
        SankeyRenderer::new().with_size(Size::new(400.0, 300.0))
    }

    #[test]
    fn test_parse_plotly_trace_array() {
        let diagram = parse_sankey(
            r#"[{
                type: "sankey",
                arrangement: "snap",
                node: { label: ["x", "y"], x: [0.1, 0.9], y: [0.5, 0.5], pad: 10 },
                link: { source: [0], target: [1], value: [1] },
            }]"#,
        )
        .unwrap();

        assert_eq!(diagram.node_count(), 2);
        assert_eq!(diagram.link_count(), 1);
        assert_eq!(diagram.label(1), "y");
        assert_eq!(diagram.title(), None);
    }

    #[test]
    fn test_bar_heights_follow_flow() {
        let layout = renderer().arrange(&parse_sankey(FORK).unwrap()).unwrap();
        let [Some(a), Some(b), Some(c)] = layout.bars() else {
            panic!("every node carries flow");
        };

        assert!(approx_eq!(f32, b.height(), 2.0 * c.height(), epsilon = 1e-3));
        assert!(approx_eq!(f32, a.height(), b.height() + c.height(), epsilon = 1e-3));
        // The right column is the fullest: bars plus one gap fill the area
        let area_height = 300.0 - 2.0 * 20.0 - TITLE_HEIGHT;
        assert!(approx_eq!(f32, b.height() + c.height() + 10.0, area_height, epsilon = 1e-2));
        assert!(b.max_y() + 10.0 <= c.min_y() + 1e-3, "stacked bars overlap");
    }

    #[test]
    fn test_depth_columns_when_unpositioned() {
        let diagram = parse_sankey(
            "{ node: { label: ['a', 'b', 'c'] }, link: { source: [0, 1], target: [1, 2], value: [1, 1] } }",
        )
        .unwrap();
        let layout = renderer().arrange(&diagram).unwrap();
        let lefts: Vec<f32> = layout.bars().iter().flatten().map(|bar| bar.min_x()).collect();

        assert_eq!(lefts.len(), 3);
        assert_eq!(lefts[0], 20.0);
        assert!(lefts[0] < lefts[1] && lefts[1] < lefts[2]);
        assert!(approx_eq!(f32, lefts[2] + 20.0, 400.0 - 20.0, epsilon = 1e-3));
    }

    #[test]
    fn test_manual_positions_are_clamped() {
        let diagram = parse_sankey(
            "{ node: { label: ['a', 'b'], x: [-1, 1.3], y: [0.5, 0.5] }, link: { source: [0], target: [1], value: [1] } }",
        )
        .unwrap();
        let layout = renderer().arrange(&diagram).unwrap();
        let [Some(a), Some(b)] = layout.bars() else {
            panic!("both nodes carry flow");
        };

        assert_eq!(a.min_x(), 20.0);
        assert!(approx_eq!(f32, b.max_x(), 380.0, epsilon = 1e-3));
    }

    #[test]
    fn test_nodes_without_flow_are_not_drawn() {
        let diagram = parse_sankey(
            "{ node: { label: ['a', 'b', 'lonely'] }, link: { source: [0], target: [1], value: [3] } }",
        )
        .unwrap();
        let layout = renderer().arrange(&diagram).unwrap();

        assert!(layout.bars()[0].is_some());
        assert!(layout.bars()[2].is_none());
    }

    #[test]
    fn test_bands_stack_inside_their_bars() {
        let layout = renderer().arrange(&parse_sankey(FORK).unwrap()).unwrap();
        let a = layout.bars()[0].unwrap();
        let bands = layout.bands();

        assert_eq!(bands.len(), 2);
        let total: f32 = bands.iter().map(|band| band.width).sum();
        assert!(approx_eq!(f32, total, a.height(), epsilon = 1e-3));
        for band in bands {
            assert_eq!(band.start.x(), a.max_x());
            assert!(band.start.y() - band.width / 2.0 >= a.min_y() - 1e-3);
            assert!(band.start.y() + band.width / 2.0 <= a.max_y() + 1e-3);
        }
        // b sits above c, so the band to b leaves a first
        assert!(bands[0].start.y() < bands[1].start.y());
    }

    #[test]
    fn test_invalid_documents() {
        let cases = [
            (
                "{ node: { label: ['a'] }, link: { source: [0], target: [], value: [1] } }",
                "differ in length",
            ),
            (
                "{ node: { label: ['a'] }, link: { source: [0], target: [4], value: [1] } }",
                "refers to node 4",
            ),
            (
                "{ node: { label: ['a', 'b'] }, link: { source: [0], target: [1], value: [-1] } }",
                "values must be finite",
            ),
            (
                "{ node: { label: ['a'], x: [1e39] } }",
                "not a finite number",
            ),
            ("[]", "no Sankey trace"),
        ];

        for (source, expected) in cases {
            let err = parse_sankey(source).unwrap_err();
            assert!(matches!(err, FlowpadError::Export(ExportError::Sankey(_))), "{source}");
            assert!(err.to_string().contains(expected), "{source}: {err}");
        }
    }

    #[test]
    fn test_wrong_field_shape_is_decode_error() {
        let err = parse_sankey("{ link: { source: ['a'] } }").unwrap_err();
        assert!(matches!(err, FlowpadError::Decode(_)));
    }

    #[test]
    fn test_render() {
        let output = renderer()
            .render_to_string(&parse_sankey(FORK).unwrap())
            .unwrap();

        assert!(output.contains("Fork"));
        assert!(output.contains("sankey-link"));
        assert!(output.contains(" C "));
        assert_eq!(output.matches("sankey-node").count(), 3);
        let first_fill = Color::new(NODE_PALETTE[0]).unwrap().to_string();
        assert!(output.contains(&first_fill));
    }

    #[test]
    fn test_invalid_node_color() {
        let diagram = parse_sankey(
            "{ node: { label: ['a', 'b'], color: 'reddish' }, link: { source: [0], target: [1], value: [1] } }",
        )
        .unwrap();
        let err = renderer().render(&diagram).unwrap_err();
        assert!(matches!(err, ExportError::InvalidColor(_)));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sankey.svg");
        renderer()
            .export_to(&parse_sankey(FORK).unwrap(), &path)
            .unwrap();
        assert!(fs::read_to_string(path).unwrap().contains("<svg"));
    }
}
