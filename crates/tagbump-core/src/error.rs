//! Core error types.

use std::path::PathBuf;

use tagbump_commit::VersionError;
use tagbump_config::ConfigError;
use tagbump_handler::HandlerError;
use tagbump_registry::RegistryError;
use thiserror::Error;

/// Core-related errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Handler error.
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    /// Registry error.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Version error.
    #[error("version error: {0}")]
    Version(#[from] VersionError),

    /// A handler failed in strict mode and the run was stopped.
    #[error("aborted while updating {path}: {source}")]
    Aborted {
        path: PathBuf,
        #[source]
        source: HandlerError,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
