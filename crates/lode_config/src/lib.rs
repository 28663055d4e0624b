//! Project configuration for the lode build pipeline.
//!
//! Loads and validates `lode.toml`, which declares the build entry points,
//! output settings (destination root, hash length, preserve patterns, build
//! mode), import resolution settings, and the transform rule table.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{
    BuildMode, OutputConfig, ProjectConfig, ProjectMeta, ResolveConfig, RuleConfig, StepConfig,
};
