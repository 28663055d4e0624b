//! Atomic destination writer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lode_common::glob_match;

use crate::artifact::BuildArtifact;
use crate::error::EmitError;
use crate::manifest::BuildManifest;

/// Writes a complete set of build artifacts to a destination directory.
///
/// The destination is replaced wholesale on every build: the new tree is
/// assembled in a staging directory next to the destination, entries
/// matching a preserve pattern are carried over from the old tree, and the
/// two directories are swapped with renames. Readers of the destination
/// therefore never observe a partially written build.
pub struct ArtifactWriter {
    dest_root: PathBuf,
    preserve: Vec<String>,
}

impl ArtifactWriter {
    /// Creates a writer for the given destination root.
    ///
    /// `preserve` holds glob patterns (relative to the destination root)
    /// naming entries to carry over from the previous build, such as
    /// prebuilt `dll` bundles.
    pub fn new(dest_root: impl Into<PathBuf>, preserve: Vec<String>) -> Self {
        Self {
            dest_root: dest_root.into(),
            preserve,
        }
    }

    /// The destination root this writer targets.
    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    /// Writes all artifacts and the manifest, replacing the destination
    /// atomically.
    ///
    /// Fails with [`EmitError::Collision`] before touching the filesystem
    /// if two artifacts with different content share a final name, and
    /// with [`EmitError::Locked`] if another build currently holds the
    /// destination.
    pub fn write(
        &self,
        artifacts: &[BuildArtifact],
        manifest: &BuildManifest,
    ) -> Result<(), EmitError> {
        let unique = check_collisions(artifacts)?;

        let _lock = LockFile::acquire(&sibling(&self.dest_root, "lock"))?;

        let staging = sibling(&self.dest_root, "staging");
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| io_err(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| io_err(&staging, e))?;

        if self.dest_root.is_dir() && !self.preserve.is_empty() {
            copy_preserved(&self.dest_root, &staging, &self.preserve)?;
        }

        for artifact in unique.values() {
            let target = staging.join(&artifact.name);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            fs::write(&target, &artifact.bytes).map_err(|e| io_err(&target, e))?;
        }
        manifest.save(&staging)?;

        self.swap(&staging)
    }

    /// Replaces the destination with the staged tree via renames.
    fn swap(&self, staging: &Path) -> Result<(), EmitError> {
        let old = sibling(&self.dest_root, "old");
        if old.exists() {
            fs::remove_dir_all(&old).map_err(|e| io_err(&old, e))?;
        }

        let had_dest = self.dest_root.exists();
        if had_dest {
            fs::rename(&self.dest_root, &old).map_err(|e| io_err(&self.dest_root, e))?;
        }
        if let Err(e) = fs::rename(staging, &self.dest_root) {
            // Put the previous build back so the destination stays usable.
            if had_dest {
                let _ = fs::rename(&old, &self.dest_root);
            }
            return Err(io_err(staging, e));
        }
        if had_dest {
            let _ = fs::remove_dir_all(&old);
        }
        Ok(())
    }
}

/// Verifies that no two artifacts with different content share a final
/// name. Identical duplicates (same name, same hash) are deduplicated.
fn check_collisions(
    artifacts: &[BuildArtifact],
) -> Result<BTreeMap<&str, &BuildArtifact>, EmitError> {
    let mut unique: BTreeMap<&str, &BuildArtifact> = BTreeMap::new();
    for artifact in artifacts {
        match unique.get(artifact.name.as_str()) {
            Some(existing) if existing.hash != artifact.hash => {
                return Err(EmitError::Collision {
                    name: artifact.name.clone(),
                });
            }
            Some(_) => {}
            None => {
                unique.insert(&artifact.name, artifact);
            }
        }
    }
    Ok(unique)
}

/// Copies entries of `from` matching a preserve pattern into `to`.
///
/// An entry is preserved when its root-relative path matches a pattern, or
/// when any of its ancestor directories does, so a pattern like `dll`
/// keeps the whole directory. Preserved directories are recreated even
/// when empty.
fn copy_preserved(from: &Path, to: &Path, patterns: &[String]) -> Result<(), EmitError> {
    let mut stack = vec![from.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| io_err(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                if let Some(rel) = relative_str(from, &path) {
                    if is_preserved(&rel, patterns) {
                        let target = to.join(&rel);
                        fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;
                    }
                }
                stack.push(path);
            } else if let Some(rel) = relative_str(from, &path) {
                if is_preserved(&rel, patterns) {
                    let target = to.join(&rel);
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
                    }
                    fs::copy(&path, &target).map_err(|e| io_err(&path, e))?;
                }
            }
        }
    }
    Ok(())
}

fn is_preserved(rel: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        if glob_match(pattern, rel) {
            return true;
        }
        // A pattern naming a directory preserves everything inside it.
        let mut ancestor = rel;
        while let Some(pos) = ancestor.rfind('/') {
            ancestor = &ancestor[..pos];
            if glob_match(pattern, ancestor) {
                return true;
            }
        }
        false
    })
}

fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let s = rel.to_str()?;
    Some(s.replace(std::path::MAIN_SEPARATOR, "/"))
}

/// Builds a hidden sibling path of the destination root, e.g. the
/// destination `out/dist` gets the sibling `out/.dist.lock`.
fn sibling(dest: &Path, suffix: &str) -> PathBuf {
    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dist");
    let hidden = format!(".{name}.{suffix}");
    match dest.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from(hidden),
        Some(parent) => parent.join(hidden),
        None => PathBuf::from(hidden),
    }
}

fn io_err(path: &Path, source: std::io::Error) -> EmitError {
    EmitError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Exclusive lock on the destination, released on drop.
///
/// A process killed mid-write leaves the file behind; the resulting
/// [`EmitError::Locked`] names it so the user can remove it manually.
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    fn acquire(path: &Path) -> Result<Self, EmitError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
        }
        match fs::OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => Ok(Self {
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(EmitError::Locked {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(io_err(path, e)),
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::MANIFEST_FILE;

    fn artifact(name: &str, content: &[u8]) -> BuildArtifact {
        BuildArtifact::named(name.to_string(), content.to_vec())
    }

    #[test]
    fn writes_artifacts_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dist");
        let writer = ArtifactWriter::new(&dest, vec![]);

        let mut manifest = BuildManifest::new();
        manifest.insert("index", vec!["index_ab.js".to_string()]);
        writer
            .write(&[artifact("index_ab.js", b"console.log(1)")], &manifest)
            .unwrap();

        assert_eq!(
            fs::read(dest.join("index_ab.js")).unwrap(),
            b"console.log(1)"
        );
        assert!(dest.join(MANIFEST_FILE).is_file());
    }

    #[test]
    fn nested_artifact_paths_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dist");
        let writer = ArtifactWriter::new(&dest, vec![]);

        writer
            .write(
                &[artifact("assets/logo_ff.png", b"png")],
                &BuildManifest::new(),
            )
            .unwrap();

        assert!(dest.join("assets/logo_ff.png").is_file());
    }

    #[test]
    fn replaces_previous_build() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dist");
        let writer = ArtifactWriter::new(&dest, vec![]);

        writer
            .write(&[artifact("index_old.js", b"old")], &BuildManifest::new())
            .unwrap();
        writer
            .write(&[artifact("index_new.js", b"new")], &BuildManifest::new())
            .unwrap();

        assert!(!dest.join("index_old.js").exists());
        assert!(dest.join("index_new.js").is_file());
    }

    #[test]
    fn preserves_matching_entries() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dist");
        fs::create_dir_all(dest.join("dll")).unwrap();
        fs::write(dest.join("dll/vendor.dll.js"), b"dll").unwrap();
        fs::write(dest.join("stale.js"), b"stale").unwrap();

        let writer = ArtifactWriter::new(&dest, vec!["dll".to_string()]);
        writer
            .write(&[artifact("index_ab.js", b"new")], &BuildManifest::new())
            .unwrap();

        assert_eq!(fs::read(dest.join("dll/vendor.dll.js")).unwrap(), b"dll");
        assert!(!dest.join("stale.js").exists());
        assert!(dest.join("index_ab.js").is_file());
    }

    #[test]
    fn empty_preserved_directory_survives() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dist");
        fs::create_dir_all(dest.join("dll/placeholder")).unwrap();

        let writer = ArtifactWriter::new(&dest, vec!["dll".to_string()]);
        writer
            .write(&[artifact("index_ab.js", b"new")], &BuildManifest::new())
            .unwrap();

        assert!(dest.join("dll").is_dir());
        assert!(dest.join("dll/placeholder").is_dir());
    }

    #[test]
    fn preserve_pattern_matches_files_directly() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dist");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("keep.txt"), b"keep").unwrap();
        fs::write(dest.join("drop.js"), b"drop").unwrap();

        let writer = ArtifactWriter::new(&dest, vec!["*.txt".to_string()]);
        writer.write(&[], &BuildManifest::new()).unwrap();

        assert!(dest.join("keep.txt").is_file());
        assert!(!dest.join("drop.js").exists());
    }

    #[test]
    fn collision_detected_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dist");
        let writer = ArtifactWriter::new(&dest, vec![]);

        let err = writer
            .write(
                &[artifact("same.js", b"one"), artifact("same.js", b"two")],
                &BuildManifest::new(),
            )
            .unwrap_err();

        assert!(matches!(err, EmitError::Collision { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn identical_duplicates_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dist");
        let writer = ArtifactWriter::new(&dest, vec![]);

        writer
            .write(
                &[artifact("same.js", b"one"), artifact("same.js", b"one")],
                &BuildManifest::new(),
            )
            .unwrap();

        assert_eq!(fs::read(dest.join("same.js")).unwrap(), b"one");
    }

    #[test]
    fn concurrent_writer_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dist");
        let lock = sibling(&dest, "lock");
        fs::write(&lock, b"").unwrap();

        let writer = ArtifactWriter::new(&dest, vec![]);
        let err = writer.write(&[], &BuildManifest::new()).unwrap_err();
        assert!(matches!(err, EmitError::Locked { .. }));
    }

    #[test]
    fn lock_released_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dist");
        let writer = ArtifactWriter::new(&dest, vec![]);

        writer.write(&[], &BuildManifest::new()).unwrap();
        assert!(!sibling(&dest, "lock").exists());

        // A second build acquires the lock again without trouble.
        writer.write(&[], &BuildManifest::new()).unwrap();
    }
}
