//! Error types for artifact emission.

use std::path::PathBuf;

/// Errors that can occur while writing build outputs.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// An I/O error occurred while cleaning or writing the destination.
    #[error("emit I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Two distinct-content artifacts resolved to the same final filename.
    ///
    /// Should not occur given hash embedding, but is checked before any
    /// write happens.
    #[error("artifact filename collision: {name}")]
    Collision {
        /// The colliding final filename.
        name: String,
    },

    /// Another writer currently holds the destination root.
    ///
    /// A crashed build can leave the lock file behind; it is safe to
    /// delete once no build is running.
    #[error(
        "destination is locked by another build: {path} \
         (if no build is running, remove this file and retry)"
    )]
    Locked {
        /// The lock file path.
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_display() {
        let err = EmitError::Collision {
            name: "index_abc123.js".to_string(),
        };
        assert!(err.to_string().contains("index_abc123.js"));
    }

    #[test]
    fn locked_display_names_lock_file_and_recovery() {
        let err = EmitError::Locked {
            path: PathBuf::from(".dist.lock"),
        };
        let msg = err.to_string();
        assert!(msg.contains(".dist.lock"));
        assert!(msg.contains("remove this file"));
    }

    #[test]
    fn io_display() {
        let err = EmitError::Io {
            path: PathBuf::from("dist/index.js"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(err.to_string().contains("dist/index.js"));
    }
}
