//! Error types for transform rules and execution.

use std::path::PathBuf;

/// Errors that can occur while building the rule table or running a chain.
///
/// Any transform error aborts the whole build; partial output is discarded.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// No registered rule pattern matches the module's filename.
    #[error("no transform rule matches {path}")]
    NoMatchingRule {
        /// The module with no applicable rule.
        path: PathBuf,
    },

    /// A step in the chain failed; the chain is aborted.
    #[error("transform step '{step}' failed on {path}: {reason}")]
    Step {
        /// Name of the failing step.
        step: &'static str,
        /// The module being transformed.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// A configured step name is not a known transform step.
    #[error("unknown transform step '{name}'")]
    UnknownStep {
        /// The unrecognized step name from the configuration.
        name: String,
    },

    /// A configured step is missing a required option.
    #[error("transform step '{step}' requires the '{option}' option")]
    MissingOption {
        /// The step name.
        step: String,
        /// The missing option key.
        option: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_matching_rule_display() {
        let err = TransformError::NoMatchingRule {
            path: PathBuf::from("src/data.bin"),
        };
        assert!(err.to_string().contains("src/data.bin"));
    }

    #[test]
    fn step_failure_display() {
        let err = TransformError::Step {
            step: "strip_comments",
            path: PathBuf::from("src/app.js"),
            reason: "module content is not valid UTF-8".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("strip_comments"));
        assert!(msg.contains("src/app.js"));
        assert!(msg.contains("UTF-8"));
    }

    #[test]
    fn unknown_step_display() {
        let err = TransformError::UnknownStep {
            name: "minify_harder".to_string(),
        };
        assert_eq!(err.to_string(), "unknown transform step 'minify_harder'");
    }

    #[test]
    fn missing_option_display() {
        let err = TransformError::MissingOption {
            step: "banner".to_string(),
            option: "text".to_string(),
        };
        assert!(err.to_string().contains("banner"));
        assert!(err.to_string().contains("text"));
    }
}
