//! Diagram edges and the connection requests that create them.

use serde::{Deserialize, Serialize};

use crate::{lenient, style::Style};

/// Arrow head drawn at an edge end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    #[default]
    Arrow,
    #[serde(rename = "arrowclosed")]
    ArrowClosed,
}

/// Marker attached to an edge end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marker {
    #[serde(rename = "type")]
    kind: MarkerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

impl Marker {
    pub fn new(kind: MarkerKind) -> Self {
        Self { kind, color: None }
    }

    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

/// A directed connection between two nodes.
///
/// `source` and `target` name node ids. Nothing here checks that they
/// exist; the store rejects dangling endpoints on connect and reconnect, but
/// imported or restored edges are taken as they come.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Edge {
    #[serde(deserialize_with = "lenient::string")]
    id: String,
    #[serde(deserialize_with = "lenient::string")]
    source: String,
    #[serde(deserialize_with = "lenient::string")]
    target: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    source_handle: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    target_handle: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    label: Option<String>,
    /// Rendering variant tag, e.g. `floating`.
    #[serde(
        rename = "type",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    variant: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    animated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<Style>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker_end: Option<Marker>,
    #[serde(skip_serializing_if = "is_false")]
    selected: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Builds the edge described by a completed connection gesture.
    pub fn from_connection(connection: &Connection) -> Self {
        Self {
            id: connection.edge_id(),
            source: connection.source.clone(),
            target: connection.target.clone(),
            source_handle: connection.source_handle.clone(),
            target_handle: connection.target_handle.clone(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_marker_end(mut self, marker: Marker) -> Self {
        self.marker_end = Some(marker);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn source_handle(&self) -> Option<&str> {
        self.source_handle.as_deref()
    }

    pub fn target_handle(&self) -> Option<&str> {
        self.target_handle.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    pub fn marker_end(&self) -> Option<&Marker> {
        self.marker_end.as_ref()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Returns true if this edge joins the same endpoints and handles as
    /// `connection`.
    pub fn matches(&self, connection: &Connection) -> bool {
        self.source == connection.source
            && self.target == connection.target
            && self.source_handle == connection.source_handle
            && self.target_handle == connection.target_handle
    }

    /// Moves both endpoints to those of `connection`. The id is kept.
    pub fn set_endpoints(&mut self, connection: &Connection) {
        self.source = connection.source.clone();
        self.target = connection.target.clone();
        self.source_handle = connection.source_handle.clone();
        self.target_handle = connection.target_handle.clone();
    }
}

/// A proposed edge produced by a connect or reconnect gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_handles(
        mut self,
        source_handle: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        self.source_handle = Some(source_handle.into());
        self.target_handle = Some(target_handle.into());
        self
    }

    /// Id given to the edge this connection creates.
    pub fn edge_id(&self) -> String {
        format!(
            "reactflow__edge-{}{}-{}{}",
            self.source,
            self.source_handle.as_deref().unwrap_or_default(),
            self.target,
            self.target_handle.as_deref().unwrap_or_default(),
        )
    }
}
