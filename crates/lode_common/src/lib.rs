//! Shared foundational types used across the lode build pipeline.
//!
//! This crate provides content hashing, hashed output filename construction,
//! and file-type detection shared by the graph, transform, cache, and emit
//! crates.

#![warn(missing_docs)]

pub mod glob;
pub mod hash;
pub mod kind;

pub use glob::glob_match;
pub use hash::{hashed_file_name, ContentHash};
pub use kind::ModuleKind;
