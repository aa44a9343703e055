//! Error types for producing action results.

use std::path::PathBuf;

use kiln_cache::CacheError;

/// Errors raised while producing an action's value.
///
/// Combinators never fail; every error originates from a producer or from the
/// cache protocol around it and is propagated to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// A source or template file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A page file is malformed.
    #[error("failed to parse page {path}: {reason}")]
    Parse {
        /// The page file.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// A template could not be applied.
    #[error("failed to render template {template}: {reason}")]
    Render {
        /// The template file.
        template: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// The cache around the action failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A custom producer failed.
    #[error("{0}")]
    Produce(String),
}
