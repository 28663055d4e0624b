//! Artifact emission for the lode build pipeline.
//!
//! Assigns content-derived hashed filenames to build outputs, checks for
//! filename collisions, and writes the destination tree atomically: the
//! complete output (plus entries preserved by glob patterns) is staged in
//! a sibling directory and swapped into place with renames, so a failed
//! build never leaves a half-written destination. A lock file enforces the
//! single-writer discipline on the destination root.

#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod manifest;
pub mod writer;

pub use artifact::BuildArtifact;
pub use error::EmitError;
pub use manifest::BuildManifest;
pub use writer::ArtifactWriter;
