//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// [`NotFound`](CacheError::NotFound), [`Decode`](CacheError::Decode) and
/// [`InvalidHeader`](CacheError::InvalidHeader) mean the entry must be
/// recomputed; callers should never treat them as fatal.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No cache entry exists for the requested logical path.
    #[error("no cache entry at {path}")]
    NotFound {
        /// The cache file that was looked up.
        path: PathBuf,
    },

    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A value could not be serialized into a cache entry.
    #[error("failed to encode cache entry: {reason}")]
    Encode {
        /// Description of the encoding failure.
        reason: String,
    },

    /// A cache entry's bytes could not be decoded into the requested type.
    #[error("failed to decode cache entry {path}: {reason}")]
    Decode {
        /// The cache file that failed to decode.
        path: PathBuf,
        /// Description of the decoding failure.
        reason: String,
    },

    /// A cache entry has an invalid or incompatible header.
    #[error("invalid cache entry header in {path}: {reason}")]
    InvalidHeader {
        /// The cache file path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },
}

impl CacheError {
    /// Returns `true` if this error only means the entry must be rebuilt.
    pub fn is_rebuild_worthy(&self) -> bool {
        matches!(
            self,
            CacheError::NotFound { .. }
                | CacheError::Decode { .. }
                | CacheError::InvalidHeader { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = CacheError::NotFound {
            path: PathBuf::from("_cache/index.html"),
        };
        assert_eq!(err.to_string(), "no cache entry at _cache/index.html");
    }

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/cache/about.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("about.html"));
    }

    #[test]
    fn decode_error_display() {
        let err = CacheError::Decode {
            path: PathBuf::from("old.html"),
            reason: "unexpected end of input".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to decode"));
        assert!(msg.contains("unexpected end of input"));
    }

    #[test]
    fn invalid_header_display() {
        let err = CacheError::InvalidHeader {
            path: PathBuf::from("bad.html"),
            reason: "missing magic bytes".to_string(),
        };
        assert!(err.to_string().contains("missing magic bytes"));
    }

    #[test]
    fn rebuild_worthy_classification() {
        let not_found = CacheError::NotFound {
            path: PathBuf::from("a"),
        };
        let decode = CacheError::Decode {
            path: PathBuf::from("a"),
            reason: String::new(),
        };
        let header = CacheError::InvalidHeader {
            path: PathBuf::from("a"),
            reason: String::new(),
        };
        let io = CacheError::Io {
            path: PathBuf::from("a"),
            source: std::io::Error::other("disk full"),
        };
        let encode = CacheError::Encode {
            reason: String::new(),
        };
        assert!(not_found.is_rebuild_worthy());
        assert!(decode.is_rebuild_worthy());
        assert!(header.is_rebuild_worthy());
        assert!(!io.is_rebuild_worthy());
        assert!(!encode.is_rebuild_worthy());
    }
}
