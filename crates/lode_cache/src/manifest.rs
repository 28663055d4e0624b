//! Cache manifest tracking per-module cache state.
//!
//! The manifest is stored as `manifest.json` in the cache directory. Each
//! entry records the module's content hash and transform-chain identity at
//! the time its output was stored; a mismatch on either is a miss.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lode_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Name of the manifest file within the cache directory.
const MANIFEST_FILE: &str = "manifest.json";

/// Top-level cache manifest tracking all cached module outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    /// lode version that produced this cache. Invalidate on version change.
    pub lode_version: String,

    /// Per-module cache state, keyed by module path.
    pub modules: HashMap<PathBuf, ModuleEntry>,
}

/// Cached state for a single module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Content hash of the module source when its output was stored.
    pub content_hash: ContentHash,

    /// Identity hash of the transform chain that produced the output.
    pub chain_hash: ContentHash,

    /// Key of the stored output payload.
    pub output_key: String,
}

impl CacheManifest {
    /// Creates a new, empty cache manifest for the given lode version.
    pub fn new(lode_version: &str) -> Self {
        Self {
            lode_version: lode_version.to_string(),
            modules: HashMap::new(),
        }
    }

    /// Loads the manifest from the cache directory, returning `None` if
    /// the file doesn't exist or can't be parsed.
    ///
    /// This is fail-safe: any error results in `None` (cache miss),
    /// triggering a full rebuild.
    pub fn load(cache_dir: &Path) -> Option<Self> {
        let path = cache_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Saves the manifest to the cache directory.
    ///
    /// Creates the cache directory if it doesn't exist.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;
        let path = cache_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Returns `true` if this manifest was produced by a compatible lode version.
    pub fn is_compatible(&self, current_version: &str) -> bool {
        self.lode_version == current_version
    }
}
