//! Lazily populated handler caches.

use std::path::{Path, PathBuf};

use semver::Version;

use crate::HandlerResult;

/// Per-path state shared by the concrete handlers.
///
/// `content` and `version` start empty, are filled on first use and stay
/// cached until [`HandlerState::reset`].
#[derive(Debug, Clone)]
pub struct HandlerState<C> {
    path: PathBuf,
    content: Option<C>,
    version: Option<Version>,
}

impl<C> HandlerState<C> {
    /// Creates an empty state for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: None,
            version: None,
        }
    }

    /// The managed file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached content, loading it with `load` on first access.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `load`; nothing is cached then.
    pub fn content_or_load<F>(&mut self, load: F) -> HandlerResult<&mut C>
    where
        F: FnOnce(&Path) -> HandlerResult<C>,
    {
        let content = match self.content.take() {
            Some(content) => content,
            None => load(&self.path)?,
        };
        Ok(self.content.insert(content))
    }

    /// Replaces the cached content.
    pub fn set_content(&mut self, content: C) {
        self.content = Some(content);
    }

    /// The cached version, if one has been derived.
    #[must_use]
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Caches `version`.
    pub fn set_version(&mut self, version: Version) {
        self.version = Some(version);
    }

    /// Drops both caches so they are derived again from disk.
    pub fn reset(&mut self) {
        self.content = None;
        self.version = None;
    }
}
