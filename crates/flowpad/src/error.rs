//! Error types for Flowpad operations.
//!
//! This module provides the main error type [`FlowpadError`] which wraps
//! the failures that can occur while importing, laying out, persisting and
//! exporting a diagram.

use std::io;

use thiserror::Error;

use flowpad_parser::ParseError;

use crate::{export::ExportError, layout::LayoutError, persist::StorageError};

/// The main error type for Flowpad operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the diagnostics so a
/// front end can render labeled snippets.
#[derive(Debug, Error)]
pub enum FlowpadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl FlowpadError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
