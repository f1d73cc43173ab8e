//! Importing nodes and edges from files.
//!
//! Files hold a relaxed-JSON array: comments, trailing commas and unquoted
//! keys are accepted. Each element decodes into a [`Node`] or [`Edge`]:
//! missing fields take their defaults, numeric ids and labels read as text,
//! and unknown node kinds are kept. A top-level value that is not an array
//! is rejected, as are values no field can hold, such as an object for an
//! id or a coordinate beyond the `f32` range.

use std::{fs, path::Path};

use log::{debug, info};
use serde::de::DeserializeOwned;

use flowpad_core::{edge::Edge, node::Node};

use crate::error::FlowpadError;

/// Parses relaxed-JSON source and decodes it into `T`.
pub(crate) fn parse_document<T: DeserializeOwned>(source: &str) -> Result<T, FlowpadError> {
    let value =
        flowpad_parser::parse(source).map_err(|err| FlowpadError::new_parse_error(err, source))?;
    Ok(serde_json::from_value(value)?)
}

fn parse_array<T: DeserializeOwned>(
    source: &str,
    what: &'static str,
) -> Result<Vec<T>, FlowpadError> {
    let items: Vec<T> = parse_document(source)?;
    debug!(kind = what, count = items.len(); "Decoded import");
    Ok(items)
}

fn read_array<T: DeserializeOwned>(
    path: &Path,
    what: &'static str,
) -> Result<Vec<T>, FlowpadError> {
    info!(path:? = path, kind = what; "Reading import file");
    let source = fs::read_to_string(path)?;
    parse_array(&source, what)
}

/// Parses relaxed-JSON source into nodes, in document order.
///
/// # Errors
///
/// Returns [`FlowpadError::Parse`] for malformed text and
/// [`FlowpadError::Decode`] when the document is not an array of nodes.
pub fn parse_nodes(source: &str) -> Result<Vec<Node>, FlowpadError> {
    parse_array(source, "nodes")
}

/// Parses relaxed-JSON source into edges, in document order.
///
/// # Errors
///
/// See [`parse_nodes`].
pub fn parse_edges(source: &str) -> Result<Vec<Edge>, FlowpadError> {
    parse_array(source, "edges")
}

/// Reads and parses a node file.
pub fn read_nodes(path: impl AsRef<Path>) -> Result<Vec<Node>, FlowpadError> {
    read_array(path.as_ref(), "nodes")
}

/// Reads and parses an edge file.
pub fn read_edges(path: impl AsRef<Path>) -> Result<Vec<Edge>, FlowpadError> {
    read_array(path.as_ref(), "edges")
}
