//! Content-addressed binary storage for cached transform outputs.
//!
//! Each stored payload gets a header with magic bytes, a format version,
//! and a checksum. Reads validate all three and treat any mismatch as a
//! miss, so a corrupted store never poisons a build.

use std::path::{Path, PathBuf};

use lode_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Magic bytes identifying a lode cache artifact.
const STORE_MAGIC: [u8; 4] = *b"LODE";

/// Current store format version. Increment on breaking changes to
/// the header or payload format.
const STORE_FORMAT_VERSION: u32 = 1;

/// Header prepended to every stored payload for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHeader {
    /// Magic bytes: must be `b"LODE"`.
    pub magic: [u8; 4],

    /// Store format version.
    pub format_version: u32,

    /// lode version that produced this payload.
    pub tool_version: String,

    /// Content hash of the payload (for integrity checks).
    pub checksum: ContentHash,
}

/// Content-addressed store for binary payloads.
///
/// Payloads live at `<cache_dir>/<subdir>/<key>.bin`, where the key is the
/// hex form of a content hash supplied by the caller.
pub struct OutputStore {
    /// Root cache directory.
    cache_dir: PathBuf,
}

/// File extension for stored payloads.
const STORE_EXT: &str = "bin";

impl OutputStore {
    /// Creates a store rooted at the given cache directory.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Returns the file path for a payload with the given key.
    pub fn payload_path(&self, subdir: &str, key: &str) -> PathBuf {
        self.cache_dir.join(subdir).join(format!("{key}.{STORE_EXT}"))
    }

    /// Writes a payload to the store and returns its key.
    ///
    /// The key is the hex form of `key_hash`. The payload is prefixed with
    /// a validated binary header.
    pub fn write(
        &self,
        subdir: &str,
        key_hash: &ContentHash,
        payload: &[u8],
        tool_version: &str,
    ) -> Result<String, CacheError> {
        let dir = self.cache_dir.join(subdir);
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io {
            path: dir,
            source: e,
        })?;

        let key = key_hash.to_string();
        let path = self.payload_path(subdir, &key);

        let header = StoreHeader {
            magic: STORE_MAGIC,
            format_version: STORE_FORMAT_VERSION,
            tool_version: tool_version.to_string(),
            checksum: ContentHash::from_bytes(payload),
        };

        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        // Layout: 4-byte header length (little-endian) + header + payload
        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(payload);

        std::fs::write(&path, &output).map_err(|e| CacheError::Io { path, source: e })?;

        Ok(key)
    }

    /// Reads a payload from the store, validating its header.
    ///
    /// Returns `None` if the file doesn't exist, the header is invalid,
    /// the format version doesn't match, or the checksum doesn't verify.
    pub fn read(&self, subdir: &str, key: &str) -> Option<Vec<u8>> {
        let path = self.payload_path(subdir, key);
        let raw = std::fs::read(&path).ok()?;

        if raw.len() < 4 {
            return None;
        }

        let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
        if raw.len() < 4 + header_len {
            return None;
        }

        let header: StoreHeader =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .ok()?
                .0;

        if header.magic != STORE_MAGIC {
            return None;
        }
        if header.format_version != STORE_FORMAT_VERSION {
            return None;
        }

        let payload = &raw[4 + header_len..];
        if ContentHash::from_bytes(payload) != header.checksum {
            return None;
        }

        Some(payload.to_vec())
    }

    /// Removes payloads whose key is not in `live_keys`.
    ///
    /// Returns the number of files removed.
    pub fn gc(&self, subdir: &str, live_keys: &[&str]) -> Result<usize, CacheError> {
        let dir = self.cache_dir.join(subdir);
        if !dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        let entries = std::fs::read_dir(&dir).map_err(|e| CacheError::Io {
            path: dir.clone(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| CacheError::Io {
                path: dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(STORE_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !live_keys.contains(&stem) {
                        std::fs::remove_file(&path).map_err(|e| CacheError::Io {
                            path: path.clone(),
                            source: e,
                        })?;
                        removed += 1;
                    }
                }
            }
        }

        Ok(removed)
    }
}
