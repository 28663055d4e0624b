//! Deterministic import specifier resolution.
//!
//! Resolution tries candidates in a fixed order so identical inputs always
//! produce identical graphs: the exact path, the path with each configured
//! extension appended, then a directory index file per extension. Relative
//! specifiers resolve against the importing file, `/`-prefixed specifiers
//! against the project root, and bare specifiers against each configured
//! module directory in order.

use std::path::{Component, Path, PathBuf};

use crate::error::GraphError;

/// Resolves import specifiers to concrete module paths.
#[derive(Debug, Clone)]
pub struct Resolver {
    /// Project root directory.
    root: PathBuf,
    /// Extensions tried when a specifier has no direct match.
    extensions: Vec<String>,
    /// Directories searched for bare specifiers, relative to the root.
    module_dirs: Vec<String>,
}

impl Resolver {
    /// Creates a resolver for the given project root.
    pub fn new(root: &Path, extensions: Vec<String>, module_dirs: Vec<String>) -> Self {
        Self {
            root: root.to_path_buf(),
            extensions,
            module_dirs,
        }
    }

    /// The project root this resolver operates under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The module directories searched for bare specifiers.
    pub fn module_dirs(&self) -> &[String] {
        &self.module_dirs
    }

    /// Resolves a specifier from the given importing module.
    ///
    /// Fails with [`GraphError::UnresolvedImport`] if no candidate exists.
    pub fn resolve(&self, specifier: &str, importer: &Path) -> Result<PathBuf, GraphError> {
        let bases: Vec<PathBuf> = if specifier.starts_with("./") || specifier.starts_with("../") {
            let dir = importer.parent().unwrap_or(&self.root);
            vec![dir.join(specifier)]
        } else if let Some(rest) = specifier.strip_prefix('/') {
            vec![self.root.join(rest)]
        } else {
            self.module_dirs
                .iter()
                .map(|dir| self.root.join(dir).join(specifier))
                .collect()
        };

        for base in &bases {
            if let Some(found) = self.try_candidates(base) {
                return Ok(found);
            }
        }

        Err(GraphError::UnresolvedImport {
            specifier: specifier.to_string(),
            importer: importer.to_path_buf(),
        })
    }

    /// Resolves an entry path relative to the project root.
    pub fn resolve_entry(&self, name: &str, path: &str) -> Result<PathBuf, GraphError> {
        let base = self.root.join(path);
        self.try_candidates(&base).ok_or(GraphError::EntryNotFound {
            name: name.to_string(),
            path: base,
        })
    }

    /// Tries the candidate order for a base path: exact file, appended
    /// extensions, directory index.
    fn try_candidates(&self, base: &Path) -> Option<PathBuf> {
        let base = normalize(base);
        if base.is_file() {
            return Some(base);
        }
        for ext in &self.extensions {
            let with_ext = PathBuf::from(format!("{}.{ext}", base.display()));
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
        if base.is_dir() {
            for ext in &self.extensions {
                let index = base.join(format!("index.{ext}"));
                if index.is_file() {
                    return Some(index);
                }
            }
        }
        None
    }
}

/// Lexically normalizes a path, removing `.` components and resolving `..`
/// against preceding components.
///
/// Purely textual so that the same module imported via different relative
/// routes maps to a single node identity. Symlinks are not followed.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_resolver(root: &Path) -> Resolver {
        Resolver::new(
            root,
            vec!["js".to_string(), "jsx".to_string()],
            vec!["node_modules".to_string()],
        )
    }

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn exact_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let target = write(dir.path(), "src/util.js", "");
        let importer = write(dir.path(), "src/index.js", "");

        let resolver = make_resolver(dir.path());
        let resolved = resolver.resolve("./util.js", &importer).unwrap();
        assert_eq!(resolved, target);
    }

    #[test]
    fn extension_appended() {
        let dir = tempfile::tempdir().unwrap();
        let target = write(dir.path(), "src/util.js", "");
        let importer = write(dir.path(), "src/index.js", "");

        let resolver = make_resolver(dir.path());
        let resolved = resolver.resolve("./util", &importer).unwrap();
        assert_eq!(resolved, target);
    }

    #[test]
    fn extension_order_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let js = write(dir.path(), "src/app.js", "");
        write(dir.path(), "src/app.jsx", "");
        let importer = write(dir.path(), "src/index.js", "");

        let resolver = make_resolver(dir.path());
        // "js" is listed before "jsx", so app.js wins.
        assert_eq!(resolver.resolve("./app", &importer).unwrap(), js);
    }

    #[test]
    fn directory_index() {
        let dir = tempfile::tempdir().unwrap();
        let target = write(dir.path(), "src/widgets/index.js", "");
        let importer = write(dir.path(), "src/index.js", "");

        let resolver = make_resolver(dir.path());
        let resolved = resolver.resolve("./widgets", &importer).unwrap();
        assert_eq!(resolved, target);
    }

    #[test]
    fn bare_specifier_uses_module_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = write(dir.path(), "node_modules/lodash/index.js", "");
        let importer = write(dir.path(), "src/index.js", "");

        let resolver = make_resolver(dir.path());
        let resolved = resolver.resolve("lodash", &importer).unwrap();
        assert_eq!(resolved, target);
    }

    #[test]
    fn root_relative_specifier() {
        let dir = tempfile::tempdir().unwrap();
        let target = write(dir.path(), "shared/theme.js", "");
        let importer = write(dir.path(), "src/deep/nested/index.js", "");

        let resolver = make_resolver(dir.path());
        let resolved = resolver.resolve("/shared/theme", &importer).unwrap();
        assert_eq!(resolved, target);
    }

    #[test]
    fn parent_traversal_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let target = write(dir.path(), "src/util.js", "");
        let importer = write(dir.path(), "src/pages/login.js", "");

        let resolver = make_resolver(dir.path());
        let resolved = resolver.resolve("../util", &importer).unwrap();
        assert_eq!(resolved, target);
        assert!(!resolved.display().to_string().contains(".."));
    }

    #[test]
    fn unresolved_errors() {
        let dir = tempfile::tempdir().unwrap();
        let importer = write(dir.path(), "src/index.js", "");

        let resolver = make_resolver(dir.path());
        let err = resolver.resolve("./missing", &importer).unwrap_err();
        assert!(matches!(err, GraphError::UnresolvedImport { .. }));
    }

    #[test]
    fn entry_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let target = write(dir.path(), "src/index.js", "");

        let resolver = make_resolver(dir.path());
        assert_eq!(
            resolver.resolve_entry("index", "src/index.js").unwrap(),
            target
        );
        assert_eq!(resolver.resolve_entry("index", "src/index").unwrap(), target);

        let err = resolver.resolve_entry("main", "src/main.js").unwrap_err();
        assert!(matches!(err, GraphError::EntryNotFound { .. }));
    }

    #[test]
    fn normalize_lexically() {
        assert_eq!(
            normalize(Path::new("/a/b/../c/./d.js")),
            PathBuf::from("/a/c/d.js")
        );
        assert_eq!(normalize(Path::new("a/./b")), PathBuf::from("a/b"));
    }
}
