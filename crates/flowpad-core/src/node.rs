//! Diagram nodes.
//!
//! The serialized shape follows the node objects found in import files and
//! in saved diagrams:
//!
//! ```json
//! { "id": "1", "type": "input", "data": { "label": "start" }, "position": { "x": 0, "y": 0 } }
//! ```
//!
//! Every field has a default. Imported documents are only required to parse,
//! so a node that lacks an `id` or a `position` is accepted as-is.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    color::Color,
    geometry::{self, Bounds, Point, Size},
    lenient,
    style::Style,
};

/// Node kinds understood by the editor.
///
/// Import files may name kinds the editor has no styling for; those are
/// kept as [`NodeKind::Other`] and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum NodeKind {
    /// A node with only outgoing connections.
    Input,
    /// A node with only incoming connections.
    Output,
    #[default]
    Default,
    /// A container for other nodes.
    Group,
    Other(String),
}

impl NodeKind {
    /// Parses a drag payload into one of the built-in kinds.
    ///
    /// Accepts the wire names and the aliases `source` and `sink`; anything
    /// else is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "input" | "source" => Some(Self::Input),
            "output" | "sink" => Some(Self::Output),
            "default" => Some(Self::Default),
            "group" => Some(Self::Group),
            _ => None,
        }
    }

    /// Returns the wire name of this kind.
    pub fn name(&self) -> &str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Default => "default",
            Self::Group => "group",
            Self::Other(name) => name,
        }
    }

    /// Returns the overview color for this kind.
    ///
    /// Groups and unknown kinds have no color and are drawn unfilled.
    pub fn minimap_color(&self) -> Option<Color> {
        let name = match self {
            Self::Input => "red",
            Self::Output => "blue",
            Self::Default => "green",
            Self::Group | Self::Other(_) => return None,
        };
        Color::new(name).ok()
    }
}

impl From<String> for NodeKind {
    fn from(name: String) -> Self {
        Self::from_name(&name).unwrap_or(Self::Other(name))
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Other(name) => name,
            builtin => builtin.name().to_string(),
        }
    }
}

/// Any scalar is accepted; `null` and the empty string mean the default kind.
impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = lenient::string(deserializer)?;
        if name.is_empty() {
            return Ok(Self::Default);
        }
        Ok(Self::from(name))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Side of a node where edges attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlePosition {
    Top,
    Bottom,
    Left,
    Right,
}

/// Payload of a node. Only `label` is interpreted; other keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeData {
    #[serde(deserialize_with = "lenient::string")]
    label: String,
    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

impl NodeData {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            extra: IndexMap::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A placeable, labeled vertex in the diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Node {
    #[serde(deserialize_with = "lenient::string")]
    id: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    data: NodeData,
    position: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<Style>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "geometry::finite_length"
    )]
    width: Option<f32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "geometry::finite_length"
    )]
    height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_position: Option<HandlePosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_position: Option<HandlePosition>,
    #[serde(skip_serializing_if = "is_false")]
    selected: bool,
    #[serde(skip_serializing_if = "is_false")]
    dragging: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Node {
    /// Creates a node of the given kind at the origin.
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            data: NodeData::new(label),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn label(&self) -> &str {
        self.data.label()
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    /// Returns the measured or assigned size, if both dimensions are known.
    pub fn size(&self) -> Option<Size> {
        Some(Size::new(self.width?, self.height?))
    }

    /// Returns the node's rectangle, falling back to `fallback` when unsized.
    pub fn bounds(&self, fallback: Size) -> Bounds {
        Bounds::new_from_top_left(self.position, self.size().unwrap_or(fallback))
    }

    /// True when every coordinate and length can be written as JSON.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && [self.width, self.height]
                .into_iter()
                .flatten()
                .all(f32::is_finite)
    }

    pub fn source_position(&self) -> Option<HandlePosition> {
        self.source_position
    }

    pub fn target_position(&self) -> Option<HandlePosition> {
        self.target_position
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn set_size(&mut self, size: Size) {
        self.width = Some(size.width());
        self.height = Some(size.height());
    }

    pub fn set_handles(&mut self, target: HandlePosition, source: HandlePosition) {
        self.target_position = Some(target);
        self.source_position = Some(source);
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }
}
