//! Static export of a diagram.

pub mod sankey;
pub mod svg;

use std::io;

use thiserror::Error;

use flowpad_core::color::ParseColorError;

use sankey::SankeyError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0}")]
    InvalidColor(#[from] ParseColorError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid Sankey document: {0}")]
    Sankey(#[from] SankeyError),
}
