//! Layered layout backed by `rust-sugiyama`.
//!
//! The crate ranks vertices into layers and orders each layer to reduce
//! crossings. Its raw coordinates are normalized here into layer indices
//! and cross-axis slots, then scaled by the node size and spacing and
//! rotated onto the requested direction:
//!
//! - `DOWN` grows `y` with depth and `UP` shrinks it,
//! - `RIGHT` grows `x` with depth and `LEFT` shrinks it.
//!
//! Each connected component is laid out on its own and components sit side
//! by side along the cross axis. Nodes without edges to other nodes follow
//! in a single row on the first layer.

use std::collections::{HashMap, HashSet};

use log::debug;
use rust_sugiyama::configure::Config;

use flowpad_core::geometry::Point;

use crate::layout::{LayoutError, LayoutGraph, NodePlacement};

use super::LayoutEngine;

/// Layer coordinates closer than this belong to the same layer.
const RANK_EPSILON: f64 = 1e-6;

/// Vertex coordinates of one connected component, as returned by the engine.
type ComponentCoords = Vec<(usize, (f64, f64))>;

/// A node's place within its component before scaling.
#[derive(Debug, Clone, Copy)]
struct Slot {
    index: usize,
    layer: usize,
    /// Cross-axis coordinate in units of one node plus spacing.
    offset: f64,
}

/// The Sugiyama layout engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SugiyamaEngine;

impl SugiyamaEngine {
    pub fn new() -> Self {
        Self
    }

    /// Runs `rust-sugiyama`, turning a panic inside it into an error.
    fn run_engine(edges: Vec<(u32, u32)>) -> Result<Vec<ComponentCoords>, LayoutError> {
        let layouts = std::panic::catch_unwind(move || {
            let config = Config {
                minimum_length: 1,
                vertex_spacing: 1.0,
                ..Default::default()
            };
            rust_sugiyama::from_edges(&edges, &config)
        });

        match layouts {
            Ok(results) => Ok(results.into_iter().map(|(coords, _, _)| coords).collect()),
            Err(err) => {
                let message = err
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| err.downcast_ref::<&str>().map(|msg| msg.to_string()))
                    .unwrap_or_else(|| "unknown error".to_string());
                Err(LayoutError::EnginePanicked(message))
            }
        }
    }

    /// Converts raw component coordinates into layer indices and cross
    /// offsets.
    ///
    /// The engine does not promise which way its layer axis points, so the
    /// axis is flipped when edges mostly run against it.
    fn normalize(coords: &ComponentCoords, edges: &[(u32, u32)], node_count: usize) -> Vec<Slot> {
        let by_vertex: HashMap<usize, (f64, f64)> = coords.iter().copied().collect();

        let drift: f64 = edges
            .iter()
            .filter_map(|&(source, target)| {
                let (_, source_y) = by_vertex.get(&(source as usize))?;
                let (_, target_y) = by_vertex.get(&(target as usize))?;
                Some(target_y - source_y)
            })
            .sum();
        let sign = if drift < 0.0 { -1.0 } else { 1.0 };

        let mut ranks: Vec<f64> = coords.iter().map(|&(_, (_, y))| y * sign).collect();
        ranks.sort_by(f64::total_cmp);
        ranks.dedup_by(|later, earlier| (*later - *earlier).abs() < RANK_EPSILON);

        let min_x = coords
            .iter()
            .map(|&(_, (x, _))| x)
            .fold(f64::INFINITY, f64::min);

        coords
            .iter()
            .filter(|&&(vertex, _)| vertex < node_count)
            .map(|&(vertex, (x, y))| {
                let rank = y * sign;
                Slot {
                    index: vertex,
                    layer: ranks.partition_point(|&r| r < rank - RANK_EPSILON),
                    offset: x - min_x,
                }
            })
            .collect()
    }
}

impl LayoutEngine for SugiyamaEngine {
    fn arrange(&self, graph: &LayoutGraph) -> Result<Vec<NodePlacement>, LayoutError> {
        let node_count = graph.node_count();
        if node_count == 0 {
            return Ok(Vec::new());
        }

        // Self-loops and parallel edges carry no ranking information
        let mut seen = HashSet::new();
        let edges: Vec<(u32, u32)> = graph
            .edges()
            .filter(|(source, target)| source != target)
            .filter_map(|(source, target)| {
                Some((u32::try_from(source).ok()?, u32::try_from(target).ok()?))
            })
            .filter(|edge| seen.insert(*edge))
            .collect();

        let mut components: Vec<Vec<Slot>> = if edges.is_empty() {
            Vec::new()
        } else {
            debug!(
                nodes = node_count,
                edges = edges.len();
                "Applying Sugiyama algorithm"
            );
            Self::run_engine(edges.clone())?
                .iter()
                .map(|coords| Self::normalize(coords, &edges, node_count))
                .filter(|slots| !slots.is_empty())
                .collect()
        };

        // Components follow the order of their first node
        components.sort_by_key(|slots| slots.iter().map(|slot| slot.index).min());

        let options = graph.options();
        let horizontal = graph.direction().is_horizontal();
        let size = options.node_size();
        let (flow_extent, cross_extent) = if horizontal {
            (size.width(), size.height())
        } else {
            (size.height(), size.width())
        };
        let layer_step = flow_extent + options.layer_spacing();
        let slot_step = cross_extent + options.node_spacing();

        // (index, flow, cross) before orientation
        let mut local: Vec<(usize, f32, f32)> = Vec::with_capacity(node_count);
        let mut placed = vec![false; node_count];
        let mut cross_offset = 0.0_f32;

        for slots in &components {
            let mut widest = 0.0_f32;
            for slot in slots {
                if placed[slot.index] {
                    continue;
                }
                placed[slot.index] = true;
                let cross = slot.offset as f32 * slot_step;
                widest = widest.max(cross);
                local.push((slot.index, slot.layer as f32 * layer_step, cross_offset + cross));
            }
            cross_offset += widest + slot_step;
        }

        // Isolated nodes, and anything the engine dropped, go in one row
        let mut stragglers = 0;
        for (index, is_placed) in placed.iter().enumerate() {
            if !is_placed {
                local.push((index, 0.0, cross_offset));
                cross_offset += slot_step;
                stragglers += 1;
            }
        }

        let max_flow = local.iter().map(|&(_, flow, _)| flow).fold(0.0, f32::max);
        let reversed = graph.direction().is_reversed();
        let padding = options.padding();

        let placements: Vec<NodePlacement> = local
            .into_iter()
            .map(|(index, flow, cross)| {
                let flow = if reversed { max_flow - flow } else { flow };
                let position = if horizontal {
                    Point::new(flow + padding, cross + padding)
                } else {
                    Point::new(cross + padding, flow + padding)
                };
                NodePlacement::new(index, position)
            })
            .collect();

        debug!(
            placed = placements.len(),
            components = components.len(),
            row = stragglers;
            "Layout generated"
        );

        Ok(placements)
    }
}
