//! Incremental build cache.
//!
//! Persists transformed module outputs keyed by (module path, content hash,
//! transform-chain identity), enabling rebuilds to skip unchanged modules.
//! The cache is an optimization, never a correctness dependency: all reads
//! are fail-safe (corruption or version skew is a miss) and failed writes
//! degrade to a rebuild on the next run.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod manifest;
pub mod store;

pub use cache::Cache;
pub use error::CacheError;
pub use manifest::{CacheManifest, ModuleEntry};
pub use store::OutputStore;
