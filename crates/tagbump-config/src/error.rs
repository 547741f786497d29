//! Errors raised while loading `tagbump.toml`.

use std::path::PathBuf;

use thiserror::Error;

/// Why a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `tagbump.toml` at the given path or in any parent directory.
    #[error("no tagbump.toml found at {}", .0.display())]
    NotFound(PathBuf),

    /// The file is not valid TOML or does not match the schema.
    #[error("{}: {source}", path.display())]
    InvalidToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A setting serde accepted but a run cannot use.
    #[error("invalid setting: {0}")]
    Invalid(String),

    /// The file or the working directory could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
