//! Module graph construction for the lode build pipeline.
//!
//! Given named entry files, this crate scans sources for import specifiers,
//! resolves them to concrete paths with a deterministic candidate order,
//! builds the directed module graph (rejecting cycles), and plans output
//! chunks (vendor / common / per-entry).

#![warn(missing_docs)]

pub mod chunk;
pub mod error;
pub mod graph;
pub mod resolve;
pub mod scan;

pub use chunk::{plan_chunks, ChunkPlan};
pub use error::GraphError;
pub use graph::{build_graph, ModuleGraph, ModuleNode};
pub use resolve::Resolver;
