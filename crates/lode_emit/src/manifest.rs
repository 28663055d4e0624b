//! The build manifest: entry name → emitted artifact paths.
//!
//! Entirely derived from the build, never hand-maintained. Written once
//! per successful build as `manifest.json` at the destination root. Entry
//! keys are sorted and artifact lists follow chunk load order, so two
//! builds of identical inputs serialize identically regardless of worker
//! scheduling.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EmitError;

/// Name of the manifest file within the destination root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Mapping from logical entry name to its emitted artifact paths, in load
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Entry name → destination-relative artifact paths.
    pub entries: BTreeMap<String, Vec<String>>,
}

impl BuildManifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry's artifact paths in load order.
    pub fn insert(&mut self, entry: impl Into<String>, paths: Vec<String>) {
        self.entries.insert(entry.into(), paths);
    }

    /// Serializes the manifest to pretty JSON.
    ///
    /// `BTreeMap` keys keep the output deterministic.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Writes the manifest to `manifest.json` under the given directory.
    pub fn save(&self, dir: &Path) -> Result<(), EmitError> {
        let path = dir.join(MANIFEST_FILE);
        std::fs::write(&path, self.to_json()).map_err(|e| EmitError::Io { path, source: e })
    }

    /// Loads a manifest from `manifest.json` under the given directory.
    pub fn load(dir: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(dir.join(MANIFEST_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }
}
