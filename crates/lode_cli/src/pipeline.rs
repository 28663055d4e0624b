//! Shared pipeline helpers for CLI commands.

use std::path::{Path, PathBuf};

use lode_config::ProjectConfig;

use crate::report::BuildFailure;
use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing
/// `lode.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, BuildFailure> {
    let mut current = start.to_path_buf();
    loop {
        if current.join("lode.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(BuildFailure::new(
                "config",
                format!(
                    "could not find lode.toml in {} or any parent directory",
                    start.display()
                ),
            ));
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir →
/// itself). Otherwise walks up from the current directory looking for
/// `lode.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, BuildFailure> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| BuildFailure::new("config", format!("cannot determine current directory: {e}")))?;
        find_project_root(&cwd)
    }
}

/// Loads and validates the project configuration for the resolved root.
pub fn load_project(global: &GlobalArgs) -> Result<(PathBuf, ProjectConfig), BuildFailure> {
    let project_dir = resolve_project_root(global)?;
    let config = lode_config::load_config(&project_dir)?;
    Ok((project_dir, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_root_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lode.toml"), "[project]\nname = \"x\"\n").unwrap();
        let nested = dir.path().join("src/pages");
        std::fs::create_dir_all(&nested).unwrap();

        let root = find_project_root(&nested).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn find_root_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_project_root(dir.path()).unwrap_err();
        assert_eq!(err.kind, "config");
    }

    #[test]
    fn resolve_root_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("lode.toml");
        std::fs::write(&config_path, "[project]\nname = \"x\"\n").unwrap();

        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(config_path.to_string_lossy().into_owned()),
        };
        let root = resolve_project_root(&global).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn resolve_root_from_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(dir.path().to_string_lossy().into_owned()),
        };
        let root = resolve_project_root(&global).unwrap();
        assert_eq!(root, dir.path());
    }
}
