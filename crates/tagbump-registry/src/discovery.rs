//! Handler definition search path.

use std::ffi::OsStr;
use std::path::PathBuf;

/// Environment variable listing extra handler directories.
pub const HANDLER_PATH_ENV: &str = "TAGBUMP_HANDLER_PATH";

/// Returns the per-user handler directory (`~/.tagbump/handlers`).
#[must_use]
pub fn user_handler_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tagbump").join("handlers"))
}

/// Builds the ordered, de-duplicated handler search path.
///
/// Configured directories come first, then the entries of `env_paths`
/// (a platform path list, as found in [`HANDLER_PATH_ENV`]), then the
/// per-user directory when it exists.
#[must_use]
pub fn search_paths(configured: &[PathBuf], env_paths: Option<&OsStr>) -> Vec<PathBuf> {
    let from_env = env_paths
        .map(|paths| std::env::split_paths(paths).collect::<Vec<_>>())
        .unwrap_or_default();
    let user_dir = user_handler_dir().filter(|dir| dir.is_dir());

    let mut paths: Vec<PathBuf> = Vec::new();
    let candidates = configured.iter().cloned().chain(from_env).chain(user_dir);
    for path in candidates {
        if !path.as_os_str().is_empty() && !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}
