//! Keep a Changelog file handler.
//!
//! Release blocks rendered from the commit message are inserted above the
//! most recent release, so the file stays newest-first.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use tagbump_commit::{CommitMessage, parse_version};
use tagbump_handler::{
    FileHandler, HandlerContext, HandlerError, HandlerResult, HandlerState, read_file,
    update_version, write_atomic,
};
use tracing::{debug, info};

/// Handler kind identifier.
pub const KIND: &str = "changelog";

/// File names this handler manages.
pub const FILENAME_PATTERN: &str = r"(?i)^changelog\.md$";

/// Runs after the manifests, before files that only record the version.
pub const PRIORITY: i32 = 2;

/// Content of a newly created changelog.
pub const TEMPLATE: &str = "# Changelog

All notable changes to the project will be documented in this file.

The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.1.0/),
and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).

## [Unreleased]

";

static RELEASE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^## \[\d").expect("invalid regex"));

static VERSION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("invalid regex"));

/// Handler for `CHANGELOG.md`.
#[derive(Debug)]
pub struct ChangelogHandler {
    state: HandlerState<Vec<String>>,
    date_format: String,
}

impl ChangelogHandler {
    /// Creates a handler for the changelog at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ctx: &HandlerContext) -> Self {
        Self {
            state: HandlerState::new(path),
            date_format: ctx.date_format.clone(),
        }
    }

    /// Reads the file as a list of lines, without line terminators.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self) -> HandlerResult<Vec<String>> {
        read_lines(self.state.path())
    }

    /// The cached lines, read from disk on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn content(&mut self) -> HandlerResult<&mut Vec<String>> {
        self.state.content_or_load(read_lines)
    }
}

impl FileHandler for ChangelogHandler {
    fn kind(&self) -> &str {
        KIND
    }

    fn path(&self) -> &Path {
        self.state.path()
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn create(&mut self) -> HandlerResult<()> {
        write_atomic(self.state.path(), TEMPLATE)
    }

    fn version(&mut self) -> HandlerResult<Option<Version>> {
        if let Some(version) = self.state.version() {
            return Ok(Some(version.clone()));
        }
        if !self.exists() {
            return Ok(None);
        }

        let path = self.state.path().to_path_buf();
        let lines = self.content()?;
        let Some(index) = find_latest_release(lines) else {
            debug!(path = %path.display(), "changelog has no release yet");
            return Ok(None);
        };

        let heading = &lines[index];
        let number = VERSION_NUMBER
            .find(heading)
            .ok_or_else(|| HandlerError::parse(&path, format!("no version in {heading:?}")))?;
        let version = parse_version(number.as_str())?;

        self.state.set_version(version.clone());
        Ok(Some(version))
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn apply(&mut self, message: &mut CommitMessage) -> HandlerResult<()> {
        let version = update_version(self, message)?;
        let block = message.render_markdown(&self.date_format)?;

        let path = self.state.path().to_path_buf();
        let lines = self.content()?;
        insert_release(lines, &block);
        write_atomic(&path, &render_lines(lines))?;

        info!(path = %path.display(), %version, "updated changelog");
        self.reset();
        Ok(())
    }
}

fn read_lines(path: &Path) -> HandlerResult<Vec<String>> {
    Ok(read_file(path)?.lines().map(str::to_string).collect())
}

/// Index of the first `## [x.y.z]` heading.
fn find_latest_release(lines: &[String]) -> Option<usize> {
    lines.iter().position(|line| RELEASE_HEADING.is_match(line))
}

/// Splices `block` above the latest release, or appends it after a blank line.
fn insert_release(lines: &mut Vec<String>, block: &str) {
    let block = block.lines().map(str::to_string);

    if let Some(index) = find_latest_release(lines) {
        lines.splice(index..index, block);
    } else {
        if lines.last().is_some_and(|line| !line.trim().is_empty()) {
            lines.push(String::new());
        }
        lines.extend(block);
    }
}

/// Joins lines, ending the file with a single newline.
fn render_lines(lines: &[String]) -> String {
    let mut output = lines.join("\n").trim_end().to_string();
    output.push('\n');
    output
}
