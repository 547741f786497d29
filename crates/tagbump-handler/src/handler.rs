//! The file handler contract.

use std::path::Path;

use semver::Version;
use tagbump_commit::{BumpKind, CommitMessage, DEFAULT_VERSION};
use tracing::debug;

use crate::{HandlerError, HandlerResult};

/// Priority of handlers that only record an already resolved version.
pub const DEFAULT_PRIORITY: i32 = 5;

/// Reads, creates and updates one packaging-metadata file.
///
/// Handlers are applied in ascending [`priority`](FileHandler::priority)
/// order. Files that own the version (manifests) use a low priority so the
/// version is resolved from them before files that only display it.
pub trait FileHandler {
    /// Identifier of the handler kind (e.g. "changelog").
    fn kind(&self) -> &str;

    /// The managed file.
    fn path(&self) -> &Path;

    /// Application order within a run; lower runs first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Whether a missing file may be created with default content.
    fn autocreate(&self) -> bool {
        true
    }

    /// Whether the file exists on disk.
    fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Writes the default document for this file kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn create(&mut self) -> HandlerResult<()>;

    /// The version recorded in the file, or `None` if it has none.
    ///
    /// The value is cached until [`reset`](FileHandler::reset).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds an invalid version.
    fn version(&mut self) -> HandlerResult<Option<Version>>;

    /// Drops cached content and version.
    fn reset(&mut self);

    /// Applies the commit message to the file and persists it.
    ///
    /// Implementations call [`update_version`] to resolve the version. The
    /// file is known to exist when this runs from [`update`](FileHandler::update).
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be resolved or the file cannot
    /// be written.
    fn apply(&mut self, message: &mut CommitMessage) -> HandlerResult<()>;

    /// Runs the auto-create policy, then [`apply`](FileHandler::apply).
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::FileNotFound`] for a missing file that may not
    /// be created, or any error from [`apply`](FileHandler::apply).
    fn update(&mut self, message: &mut CommitMessage) -> HandlerResult<()> {
        ensure_exists(self)?;
        self.apply(message)
    }
}

/// Creates the handler's file if it is missing and the handler allows it.
///
/// # Errors
///
/// Returns [`HandlerError::FileNotFound`] if the file is missing and the
/// handler is not auto-creatable.
pub fn ensure_exists<H: FileHandler + ?Sized>(handler: &mut H) -> HandlerResult<()> {
    if handler.exists() {
        return Ok(());
    }

    if !handler.autocreate() {
        return Err(HandlerError::FileNotFound(handler.path().to_path_buf()));
    }

    debug!(path = %handler.path().display(), kind = handler.kind(), "creating missing file");
    handler.create()?;
    handler.reset();
    Ok(())
}

/// Resolves the run's version through `handler` and applies the pending bump.
///
/// The first handler of a run sets the baseline: its own version is adopted
/// when the message has none yet. Without any version the baseline is
/// `0.0.0` with a minor bump unless another bump is pending. The pending bump
/// is consumed, so later handlers reuse the resolved version unchanged.
///
/// # Errors
///
/// Returns an error if the handler's version cannot be read.
pub fn update_version<H: FileHandler + ?Sized>(
    handler: &mut H,
    message: &mut CommitMessage,
) -> HandlerResult<Version> {
    if message.semantic_version().is_none() {
        if let Some(version) = handler.version()? {
            debug!(%version, kind = handler.kind(), "adopting version from file");
            message.set_semantic_version(version);
        } else {
            debug!(kind = handler.kind(), "no version found, starting from default");
            message.set_semantic_version(DEFAULT_VERSION);
            message.ensure_bump(BumpKind::Minor);
        }
    }

    Ok(message.bump_semantic_version()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// In-memory handler that records what happened to it.
    struct MemoryHandler {
        path: PathBuf,
        exists: bool,
        autocreate: bool,
        version: Option<Version>,
        created: bool,
        resets: usize,
        written: Option<Version>,
    }

    impl MemoryHandler {
        fn new(exists: bool, autocreate: bool, version: Option<Version>) -> Self {
            Self {
                path: PathBuf::from("memory.txt"),
                exists,
                autocreate,
                version,
                created: false,
                resets: 0,
                written: None,
            }
        }
    }

    impl FileHandler for MemoryHandler {
        fn kind(&self) -> &str {
            "memory"
        }

        fn path(&self) -> &Path {
            &self.path
        }

        fn autocreate(&self) -> bool {
            self.autocreate
        }

        fn exists(&self) -> bool {
            self.exists
        }

        fn create(&mut self) -> HandlerResult<()> {
            self.exists = true;
            self.created = true;
            Ok(())
        }

        fn version(&mut self) -> HandlerResult<Option<Version>> {
            Ok(self.version.clone())
        }

        fn reset(&mut self) {
            self.resets += 1;
        }

        fn apply(&mut self, message: &mut CommitMessage) -> HandlerResult<()> {
            let version = update_version(self, message)?;
            self.written = Some(version);
            Ok(())
        }
    }

    #[test]
    fn test_default_priority() {
        let handler = MemoryHandler::new(true, true, None);
        assert_eq!(handler.priority(), DEFAULT_PRIORITY);
    }

    #[test]
    fn test_update_existing_file() {
        let mut handler = MemoryHandler::new(true, false, Some(Version::new(1, 2, 3)));
        let mut message = CommitMessage::parse("#patch #fixed x");

        handler.update(&mut message).unwrap();

        assert!(!handler.created);
        assert_eq!(handler.written, Some(Version::new(1, 2, 4)));
    }

    #[test]
    fn test_update_autocreates_missing_file() {
        let mut handler = MemoryHandler::new(false, true, None);
        let mut message = CommitMessage::parse("#added x");

        handler.update(&mut message).unwrap();

        assert!(handler.created);
        assert_eq!(handler.resets, 1);
        assert_eq!(handler.written, Some(Version::new(0, 1, 0)));
    }

    #[test]
    fn test_update_missing_file_without_autocreate() {
        let mut handler = MemoryHandler::new(false, false, None);
        let mut message = CommitMessage::parse("#major #added x");

        let err = handler.update(&mut message).unwrap_err();

        assert!(matches!(err, HandlerError::FileNotFound(_)));
        assert!(handler.written.is_none());
        // The message is untouched so other handlers can still resolve it.
        assert_eq!(message.bump(), Some(BumpKind::Major));
        assert!(message.semantic_version().is_none());
    }

    #[test]
    fn test_update_version_adopts_file_version() {
        let mut handler = MemoryHandler::new(true, true, Some(Version::new(2, 0, 0)));
        let mut message = CommitMessage::parse("#minor");

        let version = update_version(&mut handler, &mut message).unwrap();

        assert_eq!(version, Version::new(2, 1, 0));
        assert_eq!(message.semantic_version(), Some(&Version::new(2, 1, 0)));
        assert_eq!(message.bump(), None);
    }

    #[test]
    fn test_update_version_without_bump_keeps_version() {
        let mut handler = MemoryHandler::new(true, true, Some(Version::new(2, 0, 0)));
        let mut message = CommitMessage::parse("#added x");

        let version = update_version(&mut handler, &mut message).unwrap();
        assert_eq!(version, Version::new(2, 0, 0));
    }

    #[test]
    fn test_update_version_defaults_to_minor() {
        let mut handler = MemoryHandler::new(true, true, None);
        let mut message = CommitMessage::parse("#added x");

        let version = update_version(&mut handler, &mut message).unwrap();
        assert_eq!(version, Version::new(0, 1, 0));
    }

    #[test]
    fn test_update_version_default_respects_requested_bump() {
        let mut handler = MemoryHandler::new(true, true, None);
        let mut message = CommitMessage::parse("#major");

        let version = update_version(&mut handler, &mut message).unwrap();
        assert_eq!(version, Version::new(1, 0, 0));
    }

    #[test]
    fn test_first_handler_sets_baseline() {
        let mut manifest = MemoryHandler::new(true, false, Some(Version::new(3, 4, 5)));
        let mut changelog = MemoryHandler::new(true, true, Some(Version::new(0, 9, 0)));
        let mut message = CommitMessage::parse("#minor #added x");

        manifest.update(&mut message).unwrap();
        changelog.update(&mut message).unwrap();

        assert_eq!(manifest.written, Some(Version::new(3, 5, 0)));
        assert_eq!(changelog.written, Some(Version::new(3, 5, 0)));
    }

    #[test]
    fn test_ensure_exists_noop_for_existing_file() {
        let mut handler = MemoryHandler::new(true, false, None);
        ensure_exists(&mut handler).unwrap();
        assert!(!handler.created);
        assert_eq!(handler.resets, 0);
    }

    #[test]
    fn test_trait_object_update() {
        let mut handler: Box<dyn FileHandler> =
            Box::new(MemoryHandler::new(false, true, Some(Version::new(1, 0, 0))));
        let mut message = CommitMessage::parse("#patch");

        handler.update(&mut message).unwrap();
        assert_eq!(message.semantic_version(), Some(&Version::new(1, 0, 1)));
    }
}
