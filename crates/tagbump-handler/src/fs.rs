//! File access helpers shared by handlers.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{HandlerError, HandlerResult};

/// Reads a file to a string, attaching the path to IO errors.
///
/// # Errors
///
/// Returns [`HandlerError::FileNotFound`] if the file is missing, or
/// [`HandlerError::Io`] if it cannot be read.
pub fn read_file(path: &Path) -> HandlerResult<String> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            HandlerError::FileNotFound(path.to_path_buf())
        } else {
            HandlerError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Replaces the content of `path` in one step.
///
/// Existing files are rewritten through a temporary file next to the target
/// that is renamed over it, so readers never observe a partial write. The
/// target's permissions are carried over.
///
/// # Errors
///
/// Returns [`HandlerError::Io`] if the file cannot be written or persisted.
pub fn write_atomic(path: &Path, content: &str) -> HandlerResult<()> {
    let io_error = |source| HandlerError::Io {
        path: path.to_path_buf(),
        source,
    };

    let Ok(metadata) = std::fs::metadata(path) else {
        // Nothing to protect yet.
        return std::fs::write(path, content).map_err(io_error);
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(content.as_bytes()).map_err(io_error)?;
    file.as_file()
        .set_permissions(metadata.permissions())
        .map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|e| io_error(e.error))?;

    Ok(())
}

/// Name of the directory containing `path`, used to name new manifests.
///
/// Relative paths are resolved against the working directory first.
#[must_use]
pub fn parent_dir_name(path: &Path) -> Option<String> {
    let absolute = std::path::absolute(path).ok()?;
    absolute
        .parent()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
