//! Regex-driven file handler.
//!
//! Backs the handler definitions loaded from plugin directories: a
//! definition names the files it manages and a pattern locating the version
//! inside them. No code is loaded at runtime.
//!
//! ```toml
//! kind = "version-txt"
//! filename = '(?i)^version\.txt$'
//! priority = 3
//! template = "{version}\n"
//! version_pattern = '(?m)^(?P<version>\d+\.\d+\.\d+)$'
//! ```

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use semver::Version;
use serde::Deserialize;
use tagbump_commit::{CommitMessage, DEFAULT_VERSION, parse_version};
use tagbump_handler::{
    DEFAULT_PRIORITY, FileHandler, HandlerError, HandlerResult, HandlerState, read_file,
    update_version, write_atomic,
};
use thiserror::Error;
use tracing::info;

/// Capture group holding the version in `version_pattern`.
pub const VERSION_GROUP: &str = "version";

/// Placeholder replaced by the initial version in `template`.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// A handler definition as written in a plugin file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternDefinition {
    /// Handler kind identifier.
    pub kind: String,

    /// Regex matched against file base names.
    pub filename: String,

    /// Application order; lower runs first.
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Whether missing files may be created from `template`.
    #[serde(default = "default_autocreate")]
    pub autocreate: bool,

    /// Content of a new file; must contain `{version}`.
    #[serde(default = "default_template")]
    pub template: String,

    /// Regex with a `version` named group.
    pub version_pattern: String,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn default_autocreate() -> bool {
    true
}

fn default_template() -> String {
    format!("{VERSION_PLACEHOLDER}\n")
}

/// Errors raised while compiling a definition.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid version_pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("version_pattern has no `{VERSION_GROUP}` capture group")]
    MissingVersionGroup,

    #[error("template does not contain `{VERSION_PLACEHOLDER}`")]
    MissingPlaceholder,
}

/// A validated definition, shared by every handler built from it.
#[derive(Debug)]
pub struct PatternRules {
    kind: String,
    priority: i32,
    autocreate: bool,
    template: String,
    version_pattern: Regex,
}

impl PatternRules {
    /// Validates `definition` and compiles its version pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regex, lacks the
    /// `version` group, or an auto-created file would have no version.
    pub fn compile(definition: &PatternDefinition) -> Result<Self, PatternError> {
        let version_pattern = Regex::new(&definition.version_pattern)?;
        if !version_pattern
            .capture_names()
            .any(|name| name == Some(VERSION_GROUP))
        {
            return Err(PatternError::MissingVersionGroup);
        }
        if definition.autocreate && !definition.template.contains(VERSION_PLACEHOLDER) {
            return Err(PatternError::MissingPlaceholder);
        }

        Ok(Self {
            kind: definition.kind.clone(),
            priority: definition.priority,
            autocreate: definition.autocreate,
            template: definition.template.clone(),
            version_pattern,
        })
    }

    /// Handler kind identifier.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// Handler for files described by a [`PatternDefinition`].
#[derive(Debug)]
pub struct PatternHandler {
    state: HandlerState<String>,
    rules: Arc<PatternRules>,
}

impl PatternHandler {
    /// Creates a handler for `path` following `rules`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, rules: Arc<PatternRules>) -> Self {
        Self {
            state: HandlerState::new(path),
            rules,
        }
    }

    /// Reads the file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self) -> HandlerResult<String> {
        read_file(self.state.path())
    }

    /// The cached file content, read on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn content(&mut self) -> HandlerResult<&mut String> {
        self.state.content_or_load(read_file)
    }
}

impl FileHandler for PatternHandler {
    fn kind(&self) -> &str {
        &self.rules.kind
    }

    fn path(&self) -> &Path {
        self.state.path()
    }

    fn priority(&self) -> i32 {
        self.rules.priority
    }

    fn autocreate(&self) -> bool {
        self.rules.autocreate
    }

    fn create(&mut self) -> HandlerResult<()> {
        let content = self
            .rules
            .template
            .replace(VERSION_PLACEHOLDER, &DEFAULT_VERSION.to_string());
        write_atomic(self.state.path(), &content)
    }

    fn version(&mut self) -> HandlerResult<Option<Version>> {
        if let Some(version) = self.state.version() {
            return Ok(Some(version.clone()));
        }
        if !self.exists() {
            return Ok(None);
        }

        let rules = Arc::clone(&self.rules);
        let content = self.content()?;
        let Some(span) = version_span(&rules.version_pattern, content) else {
            return Ok(None);
        };
        let version = parse_version(&content[span])?;

        self.state.set_version(version.clone());
        Ok(Some(version))
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn apply(&mut self, message: &mut CommitMessage) -> HandlerResult<()> {
        let version = update_version(self, message)?;

        let path = self.state.path().to_path_buf();
        let rules = Arc::clone(&self.rules);
        let content = self.content()?;
        let Some(span) = version_span(&rules.version_pattern, content) else {
            return Err(HandlerError::VersionNotFound(path));
        };
        content.replace_range(span, &version.to_string());
        write_atomic(&path, content)?;

        info!(path = %path.display(), kind = %rules.kind, %version, "updated file");
        self.reset();
        Ok(())
    }
}

/// Byte range of the first `version` capture.
fn version_span(pattern: &Regex, content: &str) -> Option<Range<usize>> {
    pattern
        .captures(content)
        .and_then(|caps| caps.name(VERSION_GROUP))
        .map(|m| m.range())
}
