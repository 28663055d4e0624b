//! Error types for module graph construction.

use std::path::PathBuf;

/// Errors that can occur while building the module graph.
///
/// All graph errors abort the build; there is no partial-success mode.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An entry point path does not resolve to an existing file.
    #[error("entry '{name}' does not resolve: {path}")]
    EntryNotFound {
        /// The logical entry name from the configuration.
        name: String,
        /// The configured entry path.
        path: PathBuf,
    },

    /// An import specifier could not be resolved to any candidate file.
    #[error("unresolved import '{specifier}' in {importer}")]
    UnresolvedImport {
        /// The import specifier as written in the source.
        specifier: String,
        /// The module containing the import.
        importer: PathBuf,
    },

    /// The import graph contains a cycle.
    ///
    /// The cycle lists each participating module once, ending with the
    /// module that closed the cycle back to the first.
    #[error("cyclic dependency: {}", format_cycle(cycle))]
    CyclicDependency {
        /// The modules forming the cycle, in import order.
        cycle: Vec<PathBuf>,
    },

    /// A module file could not be read.
    #[error("failed to read module {path}: {source}")]
    Io {
        /// The module path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Renders a cycle as `a.js -> b.js -> a.js`.
fn format_cycle(cycle: &[PathBuf]) -> String {
    let mut parts: Vec<String> = cycle.iter().map(|p| p.display().to_string()).collect();
    if let Some(first) = cycle.first() {
        parts.push(first.display().to_string());
    }
    parts.join(" -> ")
}
