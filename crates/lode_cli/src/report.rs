//! Structured failure reporting.
//!
//! Every pipeline error is normalized into a [`BuildFailure`] carrying the
//! failing stage, the path involved (when one exists), and a message, then
//! rendered to stderr as text or JSON per `--format`.

use std::path::PathBuf;

use serde::Serialize;

use lode_config::ConfigError;
use lode_emit::EmitError;
use lode_graph::GraphError;
use lode_transform::TransformError;

use crate::ReportFormat;

/// A build failure prepared for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct BuildFailure {
    /// The pipeline stage that failed (`config`, `graph`, `transform`,
    /// `emit`).
    pub kind: &'static str,
    /// The file the failure concerns, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Human-readable description of the failure.
    pub message: String,
}

impl BuildFailure {
    /// Creates a failure with no associated path.
    pub fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: None,
            message: message.into(),
        }
    }

    /// Renders the failure to stderr in the requested format.
    pub fn report(&self, format: ReportFormat) {
        match format {
            ReportFormat::Text => {
                eprintln!("error[{}]: {}", self.kind, self.message);
                if let Some(ref path) = self.path {
                    eprintln!("  --> {}", path.display());
                }
            }
            ReportFormat::Json => {
                let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
                eprintln!("{json}");
            }
        }
    }
}

impl From<ConfigError> for BuildFailure {
    fn from(e: ConfigError) -> Self {
        Self::new("config", e.to_string())
    }
}

impl From<GraphError> for BuildFailure {
    fn from(e: GraphError) -> Self {
        let path = match &e {
            GraphError::EntryNotFound { path, .. } => Some(path.clone()),
            GraphError::UnresolvedImport { importer, .. } => Some(importer.clone()),
            GraphError::CyclicDependency { cycle } => cycle.first().cloned(),
            GraphError::Io { path, .. } => Some(path.clone()),
        };
        Self {
            kind: "graph",
            path,
            message: e.to_string(),
        }
    }
}

impl From<TransformError> for BuildFailure {
    fn from(e: TransformError) -> Self {
        let path = match &e {
            TransformError::NoMatchingRule { path } => Some(path.clone()),
            TransformError::Step { path, .. } => Some(path.clone()),
            TransformError::UnknownStep { .. } | TransformError::MissingOption { .. } => None,
        };
        Self {
            kind: "transform",
            path,
            message: e.to_string(),
        }
    }
}

impl From<EmitError> for BuildFailure {
    fn from(e: EmitError) -> Self {
        let path = match &e {
            EmitError::Io { path, .. } => Some(path.clone()),
            EmitError::Locked { path } => Some(path.clone()),
            EmitError::Collision { .. } => None,
        };
        Self {
            kind: "emit",
            path,
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_failure_carries_importer() {
        let failure = BuildFailure::from(GraphError::UnresolvedImport {
            specifier: "./missing".to_string(),
            importer: PathBuf::from("src/index.js"),
        });
        assert_eq!(failure.kind, "graph");
        assert_eq!(failure.path.as_deref(), Some(std::path::Path::new("src/index.js")));
        assert!(failure.message.contains("./missing"));
    }

    #[test]
    fn cycle_failure_points_at_first_module() {
        let failure = BuildFailure::from(GraphError::CyclicDependency {
            cycle: vec![PathBuf::from("a.js"), PathBuf::from("b.js")],
        });
        assert_eq!(failure.path.as_deref(), Some(std::path::Path::new("a.js")));
    }

    #[test]
    fn transform_failure_kind() {
        let failure = BuildFailure::from(TransformError::NoMatchingRule {
            path: PathBuf::from("src/app.wasm"),
        });
        assert_eq!(failure.kind, "transform");
        assert!(failure.path.is_some());
    }

    #[test]
    fn json_serialization_omits_missing_path() {
        let failure = BuildFailure::new("config", "missing required field: project.name");
        let json = serde_json::to_string(&failure).unwrap();
        assert!(!json.contains("\"path\""));
        assert!(json.contains("\"kind\":\"config\""));
    }

    #[test]
    fn json_serialization_includes_path() {
        let failure = BuildFailure::from(TransformError::Step {
            step: "banner",
            path: PathBuf::from("src/index.js"),
            reason: "bad input".to_string(),
        });
        let json = serde_json::to_string(&failure).unwrap();
        assert!(json.contains("src/index.js"));
    }
}
