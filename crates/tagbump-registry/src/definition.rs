//! Handler definition files.

use std::path::{Path, PathBuf};

use tagbump_handler_pattern::PatternDefinition;
use tracing::debug;

use crate::{RegistryError, RegistryResult};

/// Extension of handler definition files.
const DEFINITION_EXTENSION: &str = "toml";

/// Lists the definition files in `dir`, sorted by path.
///
/// A missing directory holds no definitions.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be read.
pub fn definition_files(dir: &Path) -> RegistryResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        debug!(?dir, "handler directory does not exist, skipping");
        return Ok(Vec::new());
    }

    let io_error = |source| RegistryError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == DEFINITION_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Parses a handler definition file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid definition.
pub fn load_definition(path: &Path) -> RegistryResult<PatternDefinition> {
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|e| RegistryError::Definition {
        path: path.to_path_buf(),
        reason: e.message().to_string(),
    })
}
