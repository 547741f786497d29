//! Handler error types.

use std::path::PathBuf;

use tagbump_commit::VersionError;
use thiserror::Error;

/// Errors raised by file handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The file is missing and the handler may not create it.
    #[error("{0} not found on disk")]
    FileNotFound(PathBuf),

    /// Failed to read or write the file.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content could not be parsed.
    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// The version could not be resolved or bumped.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// The file has no version field to update.
    #[error("version not found in {0}")]
    VersionNotFound(PathBuf),

    /// The new content could not be rendered.
    #[error("failed to render {path}: {reason}")]
    Render { path: PathBuf, reason: String },
}

impl HandlerError {
    /// Creates a parse error for `path`.
    pub fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a render error for `path`.
    pub fn render(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Render {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for handler operations.
pub type HandlerResult<T> = Result<T, HandlerError>;
