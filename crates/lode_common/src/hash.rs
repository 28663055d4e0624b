//! Content hashing for cache invalidation and output filename generation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit content hash computed using XXH3.
///
/// Two byte sequences with the same `ContentHash` are assumed to be
/// identical. Used for cache invalidation, transform-chain identity, and
/// the truncated hash token embedded into output filenames.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Returns the first `len` hex characters of the hash.
    ///
    /// Used as the cache-busting token in output filenames
    /// (e.g. `bundle.abc123.js`). `len` is clamped to the full 32-character
    /// hex representation.
    pub fn short(&self, len: usize) -> String {
        let full = self.to_string();
        let len = len.min(full.len());
        full[..len].to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// Builds an output filename with an embedded truncated content hash.
///
/// The hash token is inserted between the file stem and the extension with
/// an underscore: `index.js` + content `ABC` → `index_a1b2c3.js`. Names
/// without an extension get the token appended: `LICENSE` → `LICENSE_a1b2c3`.
/// Any directory components in `logical_name` are kept as-is.
pub fn hashed_file_name(logical_name: &str, content: &[u8], hash_length: usize) -> String {
    let token = ContentHash::from_bytes(content).short(hash_length);
    let (dir, file) = match logical_name.rfind('/') {
        Some(idx) => (&logical_name[..idx + 1], &logical_name[idx + 1..]),
        None => ("", logical_name),
    };
    match file.rfind('.') {
        Some(dot) if dot > 0 => format!("{dir}{}_{token}{}", &file[..dot], &file[dot..]),
        _ => format!("{dir}{file}_{token}"),
    }
}
