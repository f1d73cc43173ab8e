//! Flowpad Core Types and Definitions
//!
//! This crate provides the data model shared by the Flowpad editor crates:
//!
//! - **Geometry**: points, sizes and bounds ([`geometry`] module)
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Nodes and edges**: the diagram elements ([`node`], [`edge`] modules)
//! - **Viewport and snapshot**: the persisted view of a diagram
//! - **Identifiers**: explicit node id generation ([`identifier::IdGenerator`])
//! - **Direction**: layered layout direction ([`direction::Direction`])

pub mod color;
pub mod direction;
pub mod edge;
pub mod geometry;
pub mod identifier;
mod lenient;
pub mod node;
pub mod snapshot;
pub mod style;
pub mod viewport;
