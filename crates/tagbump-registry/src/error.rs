//! Error types for the handler registry.

use std::path::PathBuf;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry error types.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A handler kind was registered twice.
    #[error("handler kind already registered: {0}")]
    Duplicate(String),

    /// A file name pattern is not a valid regex.
    #[error("invalid file name pattern for handler {kind}")]
    InvalidPattern {
        kind: String,
        #[source]
        source: regex::Error,
    },

    /// A handler definition file is malformed.
    #[error("invalid handler definition {path}: {reason}")]
    Definition { path: PathBuf, reason: String },

    /// Failed to read a definition directory or file.
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
