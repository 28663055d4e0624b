//! Build artifacts: content-addressed output files.

use lode_common::{hashed_file_name, ContentHash};

/// A single output file, identified by its content hash.
///
/// Created once per distinct content per build and never mutated. The name
/// is destination-relative and carries the truncated content hash, so
/// unrelated artifacts coexist without collision and stale browser caches
/// are busted on change.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildArtifact {
    /// Destination-relative output path with embedded hash token.
    pub name: String,
    /// Full content hash of the bytes.
    pub hash: ContentHash,
    /// File content.
    pub bytes: Vec<u8>,
}

impl BuildArtifact {
    /// Creates an artifact from a logical name, embedding the content hash
    /// into the filename (`index.js` → `index_abc123.js`).
    pub fn hashed(logical_name: &str, bytes: Vec<u8>, hash_length: usize) -> Self {
        let name = hashed_file_name(logical_name, &bytes, hash_length);
        let hash = ContentHash::from_bytes(&bytes);
        Self { name, hash, bytes }
    }

    /// Creates an artifact whose final name is already determined (side
    /// outputs name themselves because the producing module references
    /// the hashed URL).
    pub fn named(name: String, bytes: Vec<u8>) -> Self {
        let hash = ContentHash::from_bytes(&bytes);
        Self { name, hash, bytes }
    }
}
