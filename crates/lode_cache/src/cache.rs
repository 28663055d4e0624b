//! High-level cache orchestrator.
//!
//! The `Cache` type ties together the manifest and output store into a
//! single interface for the build pipeline. It is shared across worker
//! threads: the manifest sits behind a `RwLock` so lookups for one module
//! can proceed while another module's result is recorded, and writes are
//! serialized. Payload I/O happens outside the lock.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use lode_common::ContentHash;

use crate::error::CacheError;
use crate::manifest::{CacheManifest, ModuleEntry};
use crate::store::OutputStore;

/// Subdirectory name for stored transform outputs.
const OUT_SUBDIR: &str = "out";

/// Thread-safe incremental build cache.
///
/// Lookup key is (module path, source content hash, transform-chain
/// identity); a mismatch on any component is a miss. All reads are
/// fail-safe, and failed writes are counted rather than surfaced so the
/// cache can never fail a build.
pub struct Cache {
    /// Root directory for all cache files.
    cache_dir: PathBuf,

    /// The cache manifest tracking per-module state.
    manifest: RwLock<CacheManifest>,

    /// Content-addressed payload store.
    store: OutputStore,

    /// lode version string for compatibility checks.
    lode_version: String,

    /// When `false`, every lookup misses and every store is a no-op.
    enabled: bool,

    /// Number of store/manifest writes that failed (degraded to rebuilds).
    write_failures: AtomicUsize,
}

impl Cache {
    /// Loads an existing cache or creates a fresh one.
    ///
    /// If a manifest exists and is compatible with the current lode version,
    /// it is loaded. Otherwise a new empty manifest is created. This is
    /// fail-safe: any problem with the existing cache results in starting fresh.
    pub fn load_or_create(cache_dir: &Path, lode_version: &str) -> Self {
        let manifest = CacheManifest::load(cache_dir)
            .filter(|m| m.is_compatible(lode_version))
            .unwrap_or_else(|| CacheManifest::new(lode_version));

        Self {
            cache_dir: cache_dir.to_path_buf(),
            manifest: RwLock::new(manifest),
            store: OutputStore::new(cache_dir),
            lode_version: lode_version.to_string(),
            enabled: true,
            write_failures: AtomicUsize::new(0),
        }
    }

    /// Creates a cache that never hits and ignores all stores (`--no-cache`).
    pub fn disabled() -> Self {
        Self {
            cache_dir: PathBuf::new(),
            manifest: RwLock::new(CacheManifest::new("")),
            store: OutputStore::new(Path::new("")),
            lode_version: String::new(),
            enabled: false,
            write_failures: AtomicUsize::new(0),
        }
    }

    /// Looks up a cached output payload.
    ///
    /// Hits only when both the content hash and the chain identity match
    /// the recorded entry and the stored payload validates.
    pub fn get(
        &self,
        path: &Path,
        content_hash: ContentHash,
        chain_hash: ContentHash,
    ) -> Option<Vec<u8>> {
        if !self.enabled {
            return None;
        }
        let output_key = {
            let manifest = self.manifest.read().ok()?;
            let entry = manifest.modules.get(path)?;
            if entry.content_hash != content_hash || entry.chain_hash != chain_hash {
                return None;
            }
            entry.output_key.clone()
        };
        self.store.read(OUT_SUBDIR, &output_key)
    }

    /// Records a transform output payload for a module.
    ///
    /// Fail-safe: a failed store write or poisoned lock is counted in
    /// [`write_failures`](Self::write_failures) and otherwise ignored —
    /// the module is simply rebuilt on the next run.
    pub fn put(
        &self,
        path: &Path,
        content_hash: ContentHash,
        chain_hash: ContentHash,
        payload: &[u8],
    ) {
        if !self.enabled {
            return;
        }
        let key_hash = ContentHash::from_bytes(payload);
        let output_key =
            match self
                .store
                .write(OUT_SUBDIR, &key_hash, payload, &self.lode_version)
            {
                Ok(key) => key,
                Err(_) => {
                    self.write_failures.fetch_add(1, Ordering::Relaxed);
                    return;
                }
            };

        match self.manifest.write() {
            Ok(mut manifest) => {
                manifest.modules.insert(
                    path.to_path_buf(),
                    ModuleEntry {
                        content_hash,
                        chain_hash,
                        output_key,
                    },
                );
            }
            Err(_) => {
                self.write_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Removes manifest entries for modules no longer in the graph.
    pub fn retain_modules(&self, live_paths: &[PathBuf]) {
        if !self.enabled {
            return;
        }
        if let Ok(mut manifest) = self.manifest.write() {
            manifest.modules.retain(|path, _| live_paths.contains(path));
        }
    }

    /// Persists the current manifest to disk.
    pub fn save(&self) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }
        let manifest = self.manifest.read().map_err(|_| CacheError::Serialization {
            reason: "cache manifest lock poisoned".to_string(),
        })?;
        manifest.save(&self.cache_dir)
    }

    /// Runs garbage collection on stored payloads.
    ///
    /// Removes any payload files not referenced by the current manifest.
    /// Returns the number of files removed.
    pub fn gc(&self) -> Result<usize, CacheError> {
        if !self.enabled {
            return Ok(0);
        }
        let manifest = self.manifest.read().map_err(|_| CacheError::Serialization {
            reason: "cache manifest lock poisoned".to_string(),
        })?;
        let live_keys: Vec<&str> = manifest
            .modules
            .values()
            .map(|e| e.output_key.as_str())
            .collect();
        self.store.gc(OUT_SUBDIR, &live_keys)
    }

    /// Number of cache writes that failed since this cache was opened.
    pub fn write_failures(&self) -> usize {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Number of modules currently tracked by the manifest.
    pub fn len(&self) -> usize {
        self.manifest.read().map(|m| m.modules.len()).unwrap_or(0)
    }

    /// Returns `true` if the manifest tracks no modules.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
