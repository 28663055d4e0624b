//! Module graph construction with cycle detection.
//!
//! A depth-first traversal from each entry resolves imports and builds the
//! graph. Entries are visited in name order and imports in declaration
//! order, so the traversal (and everything derived from it, including the
//! final manifest) is deterministic for identical inputs.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use lode_common::ModuleKind;

use crate::error::GraphError;
use crate::resolve::Resolver;
use crate::scan::scan_imports;

/// A single source module in the graph.
///
/// Identity is the normalized absolute path; no two nodes share a path.
/// Dependency edges are non-owning path keys into the graph's node map.
#[derive(Debug, Clone)]
pub struct ModuleNode {
    /// Normalized path identifying this module.
    pub path: PathBuf,
    /// Detected module kind.
    pub kind: ModuleKind,
    /// Raw file content.
    pub content: Vec<u8>,
    /// Import specifiers as written in the source, in declaration order.
    pub imports: Vec<String>,
    /// Resolved dependency paths, deduplicated, in first-declaration order.
    pub deps: Vec<PathBuf>,
}

/// The resolved module graph for a set of entries.
#[derive(Debug)]
pub struct ModuleGraph {
    nodes: HashMap<PathBuf, ModuleNode>,
    /// Dependencies-before-importers traversal order.
    order: Vec<PathBuf>,
    entries: BTreeMap<String, PathBuf>,
}

impl ModuleGraph {
    /// Looks up a node by path.
    pub fn node(&self, path: &Path) -> Option<&ModuleNode> {
        self.nodes.get(path)
    }

    /// Deterministic module order: every module appears after all of its
    /// dependencies.
    pub fn order(&self) -> &[PathBuf] {
        &self.order
    }

    /// Entry name → resolved entry module path.
    pub fn entries(&self) -> &BTreeMap<String, PathBuf> {
        &self.entries
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph contains no modules.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.deps.len()).sum()
    }

    /// All modules reachable from `start`, including `start` itself.
    pub fn reachable_from(&self, start: &Path) -> BTreeSet<PathBuf> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![start.to_path_buf()];
        while let Some(path) = stack.pop() {
            if !seen.insert(path.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&path) {
                for dep in &node.deps {
                    if !seen.contains(dep) {
                        stack.push(dep.clone());
                    }
                }
            }
        }
        seen
    }
}

/// Builds the module graph for the given entry map.
///
/// Entry values are paths relative to the resolver's project root. Fails on
/// the first unresolved import, unreadable file, or dependency cycle.
pub fn build_graph(
    entries: &BTreeMap<String, String>,
    resolver: &Resolver,
) -> Result<ModuleGraph, GraphError> {
    let mut builder = GraphBuilder {
        resolver,
        nodes: HashMap::new(),
        order: Vec::new(),
        done: HashSet::new(),
        in_progress: Vec::new(),
    };

    let mut resolved_entries = BTreeMap::new();
    for (name, path) in entries {
        let entry_path = resolver.resolve_entry(name, path)?;
        builder.visit(&entry_path)?;
        resolved_entries.insert(name.clone(), entry_path);
    }

    Ok(ModuleGraph {
        nodes: builder.nodes,
        order: builder.order,
        entries: resolved_entries,
    })
}

struct GraphBuilder<'a> {
    resolver: &'a Resolver,
    nodes: HashMap<PathBuf, ModuleNode>,
    order: Vec<PathBuf>,
    done: HashSet<PathBuf>,
    /// DFS stack of modules whose imports are still being resolved.
    in_progress: Vec<PathBuf>,
}

impl GraphBuilder<'_> {
    fn visit(&mut self, path: &Path) -> Result<(), GraphError> {
        if self.done.contains(path) {
            return Ok(());
        }
        if let Some(pos) = self.in_progress.iter().position(|p| p == path) {
            return Err(GraphError::CyclicDependency {
                cycle: self.in_progress[pos..].to_vec(),
            });
        }

        let content = std::fs::read(path).map_err(|e| GraphError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let kind = ModuleKind::from_path(path);
        // Assets skip the UTF-8 decode entirely; their bytes are opaque.
        let imports = if kind.has_imports() {
            scan_imports(kind, &String::from_utf8_lossy(&content))
        } else {
            Vec::new()
        };

        self.in_progress.push(path.to_path_buf());

        let mut deps = Vec::new();
        for spec in &imports {
            let dep = self.resolver.resolve(spec, path)?;
            if !deps.contains(&dep) {
                deps.push(dep);
            }
        }
        for dep in &deps {
            self.visit(dep)?;
        }

        self.in_progress.pop();
        self.done.insert(path.to_path_buf());
        self.order.push(path.to_path_buf());
        self.nodes.insert(
            path.to_path_buf(),
            ModuleNode {
                path: path.to_path_buf(),
                kind,
                content,
                imports,
                deps,
            },
        );
        Ok(())
    }
}
