//! Layout engine seam.

pub mod sugiyama;

use super::{LayoutError, LayoutGraph, NodePlacement};

/// Computes node positions for a [`LayoutGraph`].
///
/// Implementations return one placement per node they position. The
/// request treats an unplaced node as an error.
pub trait LayoutEngine {
    fn arrange(&self, graph: &LayoutGraph) -> Result<Vec<NodePlacement>, LayoutError>;
}
