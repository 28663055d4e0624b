//! Chunk planning: vendor / common / per-entry output splitting.
//!
//! Assignment rules, applied per module:
//! 1. modules under a module directory (e.g. `node_modules`) go to `vendor`;
//! 2. modules reachable from two or more entries go to `common`;
//! 3. everything else goes to its sole entry's chunk.
//!
//! Module order within a chunk follows the graph's dependencies-first order,
//! and the per-entry load order is vendor, common, entry.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::graph::ModuleGraph;

/// Name of the chunk holding module-directory (third-party) modules.
pub const VENDOR_CHUNK: &str = "vendor";

/// Name of the chunk holding modules shared by multiple entries.
pub const COMMON_CHUNK: &str = "common";

/// The planned chunk layout for a module graph.
#[derive(Debug)]
pub struct ChunkPlan {
    /// Chunk name → member modules in dependencies-first order.
    pub chunks: BTreeMap<String, Vec<PathBuf>>,
    /// Entry name → chunk load order (vendor, common, entry; only chunks
    /// the entry actually needs).
    pub entry_chunks: BTreeMap<String, Vec<String>>,
}

/// Plans chunks for a finished module graph.
///
/// `module_dirs` are the resolver's module directory names; any module whose
/// path contains one as a component is treated as third-party.
pub fn plan_chunks(graph: &ModuleGraph, module_dirs: &[String]) -> ChunkPlan {
    // Which entries reach each module. BTreeMap iteration keeps this
    // deterministic.
    let mut reachers: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    for (entry_name, entry_path) in graph.entries() {
        for path in graph.reachable_from(entry_path) {
            reachers.entry(path).or_default().push(entry_name.clone());
        }
    }

    let mut chunks: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    let mut module_chunk: BTreeMap<PathBuf, String> = BTreeMap::new();

    for path in graph.order() {
        let Some(entries) = reachers.get(path) else {
            continue;
        };
        let chunk = if in_module_dir(path, module_dirs) {
            VENDOR_CHUNK.to_string()
        } else if entries.len() >= 2 {
            COMMON_CHUNK.to_string()
        } else {
            entries[0].clone()
        };
        chunks.entry(chunk.clone()).or_default().push(path.clone());
        module_chunk.insert(path.clone(), chunk);
    }

    let mut entry_chunks = BTreeMap::new();
    for (entry_name, entry_path) in graph.entries() {
        let reachable = graph.reachable_from(entry_path);
        let mut load_order = Vec::new();
        for shared in [VENDOR_CHUNK, COMMON_CHUNK] {
            let needed = reachable
                .iter()
                .any(|p| module_chunk.get(p).map(String::as_str) == Some(shared));
            if needed {
                load_order.push(shared.to_string());
            }
        }
        if chunks.contains_key(entry_name) {
            load_order.push(entry_name.clone());
        }
        entry_chunks.insert(entry_name.clone(), load_order);
    }

    ChunkPlan {
        chunks,
        entry_chunks,
    }
}

/// Returns `true` if any component of `path` names a module directory.
fn in_module_dir(path: &Path, module_dirs: &[String]) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|s| module_dirs.iter().any(|d| d == s))
    })
}
