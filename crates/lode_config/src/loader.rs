//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Chunk names produced by the chunk planner; entries may not shadow them.
const RESERVED_ENTRY_NAMES: [&str; 2] = ["vendor", "common"];

/// Loads and validates a `lode.toml` configuration from a project directory.
///
/// Reads `<project_dir>/lode.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join("lode.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `lode.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.entries.is_empty() {
        return Err(ConfigError::MissingField("entries".to_string()));
    }
    for (name, path) in &config.entries {
        if RESERVED_ENTRY_NAMES.contains(&name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "entry name '{name}' is reserved for a generated chunk"
            )));
        }
        if path.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "entry '{name}' has an empty path"
            )));
        }
    }
    if config.build.dest.is_empty() {
        return Err(ConfigError::MissingField("build.dest".to_string()));
    }
    if config.build.hash_length == 0 || config.build.hash_length > 32 {
        return Err(ConfigError::ValidationError(format!(
            "build.hash_length must be between 1 and 32, got {}",
            config.build.hash_length
        )));
    }
    for rule in &config.rules {
        if rule.pattern.is_empty() {
            return Err(ConfigError::ValidationError(
                "rule pattern must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BuildMode;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "app"

[entries]
index = "src/index.js"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "app");
        assert_eq!(config.entries["index"], "src/index.js");
        assert_eq!(config.build.dest, "dist");
        assert_eq!(config.build.hash_length, 6);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "app"
version = "1.2.0"
description = "demo app"

[entries]
index = "src/index.js"
login = "src/login.js"

[build]
dest = "dist"
hash_length = 8
mode = "development"
preserve = ["dll", "dll/**"]

[resolve]
extensions = ["js"]
module_dirs = ["node_modules", "vendor_libs"]

[[rules]]
pattern = "*.js"
steps = ["strip_comments", "define_mode"]

[[rules]]
pattern = "*.png"
steps = [{ step = "inline_asset", limit = 10240 }]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.version, "1.2.0");
        assert_eq!(config.entries.len(), 2);
        assert_eq!(config.build.hash_length, 8);
        assert_eq!(config.build.mode, BuildMode::Development);
        assert_eq!(config.build.preserve, vec!["dll", "dll/**"]);
        assert_eq!(config.resolve.module_dirs.len(), 2);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].pattern, "*.js");
        assert_eq!(config.rules[0].steps.len(), 2);
        assert_eq!(config.rules[1].steps[0].name(), "inline_asset");
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[project]
name = ""

[entries]
index = "src/index.js"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn missing_entries_errors() {
        let toml = r#"
[project]
name = "app"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn reserved_entry_name_errors() {
        let toml = r#"
[project]
name = "app"

[entries]
vendor = "src/vendor.js"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn hash_length_out_of_range_errors() {
        let toml = r#"
[project]
name = "app"

[entries]
index = "src/index.js"

[build]
hash_length = 64
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_rule_pattern_errors() {
        let toml = r#"
[project]
name = "app"

[entries]
index = "src/index.js"

[[rules]]
pattern = ""
steps = []
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let toml = "this is not valid toml {{{}}}";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lode.toml"),
            "[project]\nname = \"app\"\n\n[entries]\nindex = \"src/index.js\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "app");
    }
}
