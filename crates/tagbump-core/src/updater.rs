//! Applies a commit message to a set of files.

use std::path::{Path, PathBuf};

use semver::Version;
use tagbump_commit::{BumpKind, CommitMessage};
use tagbump_config::Config;
use tagbump_handler::{FileHandler, HandlerContext, HandlerError};
use tagbump_registry::HandlerRegistry;
use tracing::{debug, info, warn};

use crate::{CoreError, CoreResult, IgnoreReason, ignore_reason};

/// A handler that failed during a run.
#[derive(Debug)]
pub struct HandlerFailure {
    /// The file the handler manages.
    pub path: PathBuf,
    /// Handler kind identifier.
    pub kind: String,
    /// What went wrong.
    pub error: HandlerError,
}

/// Summary of a run that applied the message.
#[derive(Debug, Default)]
pub struct RunReport {
    /// The version resolved by the run, if any handler resolved one.
    pub version: Option<Version>,
    /// Files updated, in application order.
    pub updated: Vec<PathBuf>,
    /// Handlers that failed, in application order.
    pub failures: Vec<HandlerFailure>,
    /// Files no handler is registered for.
    pub skipped: Vec<PathBuf>,
}

impl RunReport {
    /// Whether every handler succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The failure recorded for `path`, if any.
    #[must_use]
    pub fn failure_for(&self, path: &Path) -> Option<&HandlerFailure> {
        self.failures.iter().find(|failure| failure.path == path)
    }
}

/// Result of [`Updater::run`].
#[derive(Debug)]
pub enum RunOutcome {
    /// The message is a no-op; nothing was touched.
    Ignored { reason: IgnoreReason },
    /// The message was applied.
    Updated(RunReport),
}

/// Orchestrates one run: builds handlers, orders them and applies the message.
pub struct Updater<'a> {
    registry: &'a HandlerRegistry,
    context: HandlerContext,
    default_bump: Option<BumpKind>,
    strict: bool,
}

impl<'a> Updater<'a> {
    /// Creates an updater dispatching through `registry`.
    #[must_use]
    pub fn new(registry: &'a HandlerRegistry) -> Self {
        Self {
            registry,
            context: HandlerContext::new(),
            default_bump: None,
            strict: false,
        }
    }

    /// Creates an updater using the settings of `config`.
    #[must_use]
    pub fn from_config(registry: &'a HandlerRegistry, config: &Config) -> Self {
        Self::new(registry)
            .with_context(
                HandlerContext::new().with_date_format(config.changelog.date_format.clone()),
            )
            .with_default_bump(config.version.default_bump)
            .strict(config.handlers.strict)
    }

    /// Sets the context passed to every handler.
    #[must_use]
    pub fn with_context(mut self, context: HandlerContext) -> Self {
        self.context = context;
        self
    }

    /// Sets the bump used when a message carries no bump tag.
    #[must_use]
    pub fn with_default_bump(mut self, kind: Option<BumpKind>) -> Self {
        self.default_bump = kind;
        self
    }

    /// Stops the run at the first handler failure.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The context passed to handlers.
    #[must_use]
    pub fn context(&self) -> &HandlerContext {
        &self.context
    }

    /// Parses `message` and applies it to `files`.
    ///
    /// No-op messages are detected before anything is parsed or built.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`CoreError::Aborted`] for the first failing
    /// handler. Files updated before the failure keep their new content.
    pub fn run<P: AsRef<Path>>(&self, message: &str, files: &[P]) -> CoreResult<RunOutcome> {
        if let Some(reason) = ignore_reason(message) {
            info!(%reason, "ignoring commit message");
            return Ok(RunOutcome::Ignored { reason });
        }

        let mut message = CommitMessage::parse(message);
        if let Some(kind) = self.default_bump {
            message = message.with_default_bump(kind);
        }

        self.apply(&mut message, files).map(RunOutcome::Updated)
    }

    /// Applies an already parsed message to `files`.
    ///
    /// Handlers are built fresh for this run, then applied in ascending
    /// priority. Files with equal priority keep their input order. A handler
    /// that fails leaves `message` as it found it, so the next handler
    /// resolves the version as if the failed one had not run.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`CoreError::Aborted`] for the first failing
    /// handler.
    pub fn apply<P: AsRef<Path>>(
        &self,
        message: &mut CommitMessage,
        files: &[P],
    ) -> CoreResult<RunReport> {
        let mut report = RunReport::default();
        let mut handlers = self.build_handlers(files, &mut report.skipped);
        handlers.sort_by_key(|handler| handler.priority());

        for mut handler in handlers {
            let path = handler.path().to_path_buf();
            debug!(path = %path.display(), kind = handler.kind(), "applying handler");

            // A failed handler must not leak its version into the run.
            let snapshot = message.clone();
            let result = handler.update(message);
            if result.is_err() {
                *message = snapshot;
            }

            match result {
                Ok(()) => report.updated.push(path),
                Err(error) if self.strict => {
                    return Err(CoreError::Aborted {
                        path,
                        source: error,
                    });
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "handler failed, continuing");
                    report.failures.push(HandlerFailure {
                        path,
                        kind: handler.kind().to_string(),
                        error,
                    });
                }
            }
        }

        report.version = message.semantic_version().cloned();
        if let Some(version) = &report.version {
            info!(%version, updated = report.updated.len(), "resolved version");
        }
        Ok(report)
    }

    fn build_handlers<P: AsRef<Path>>(
        &self,
        files: &[P],
        skipped: &mut Vec<PathBuf>,
    ) -> Vec<Box<dyn FileHandler>> {
        let mut seen: Vec<&Path> = Vec::new();
        let mut handlers = Vec::new();

        for path in files.iter().map(AsRef::as_ref) {
            if seen.contains(&path) {
                continue;
            }
            seen.push(path);

            match self.registry.build(path, &self.context) {
                Some(handler) => handlers.push(handler),
                None => {
                    debug!(path = %path.display(), "no handler registered, skipping");
                    skipped.push(path.to_path_buf());
                }
            }
        }

        handlers
    }
}
