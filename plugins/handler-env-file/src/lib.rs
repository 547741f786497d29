//! CI environment file handler.
//!
//! Manages `KEY=value` files such as the one GitHub Actions exposes through
//! `GITHUB_ENV`, publishing the resolved version as `SEMANTIC_VERSION`.
//! Multiline `NAME<<DELIMITER` blocks written by other steps are kept as they
//! are.

use std::path::{Path, PathBuf};

use semver::Version;
use tagbump_commit::{CommitMessage, parse_version};
use tagbump_handler::{
    DEFAULT_PRIORITY, FileHandler, HandlerContext, HandlerError, HandlerResult, HandlerState,
    read_file, update_version, write_atomic,
};
use tracing::info;

/// Handler kind identifier.
pub const KIND: &str = "env-file";

/// File names this handler manages.
pub const FILENAME_PATTERN: &str = r"(?i)^set_env_[a-z0-9-]+$";

/// Key holding the resolved version.
pub const VERSION_KEY: &str = "SEMANTIC_VERSION";

/// One entry of an env file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvEntry {
    /// A `KEY=value` line.
    Var { key: String, value: String },
    /// A `KEY<<DELIMITER` block, stored line for line including the
    /// header and the closing delimiter.
    Multiline { key: String, lines: Vec<String> },
}

impl EnvEntry {
    /// Creates a `KEY=value` entry.
    pub fn var(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Var {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The variable this entry sets.
    pub fn key(&self) -> &str {
        match self {
            Self::Var { key, .. } | Self::Multiline { key, .. } => key,
        }
    }
}

/// Entries in file order.
pub type EnvEntries = Vec<EnvEntry>;

/// Handler for `set_env_*` files.
#[derive(Debug)]
pub struct EnvFileHandler {
    state: HandlerState<EnvEntries>,
}

impl EnvFileHandler {
    /// Creates a handler for the env file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, _ctx: &HandlerContext) -> Self {
        Self {
            state: HandlerState::new(path),
        }
    }

    /// Parses the file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a non-blank line outside
    /// a multiline block has no `=`, or a block is never closed.
    pub fn read(&self) -> HandlerResult<EnvEntries> {
        read_env(self.state.path())
    }

    /// The cached entries, parsed on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn content(&mut self) -> HandlerResult<&mut EnvEntries> {
        self.state.content_or_load(read_env)
    }
}

impl FileHandler for EnvFileHandler {
    fn kind(&self) -> &str {
        KIND
    }

    fn path(&self) -> &Path {
        self.state.path()
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn create(&mut self) -> HandlerResult<()> {
        write_atomic(self.state.path(), "")
    }

    fn version(&mut self) -> HandlerResult<Option<Version>> {
        if let Some(version) = self.state.version() {
            return Ok(Some(version.clone()));
        }
        if !self.exists() {
            return Ok(None);
        }

        // The runner applies entries in order, so the last one wins.
        let path = self.state.path().to_path_buf();
        let raw = match self
            .content()?
            .iter()
            .rev()
            .find(|entry| entry.key() == VERSION_KEY)
        {
            None => return Ok(None),
            Some(EnvEntry::Var { value, .. }) => value.clone(),
            Some(EnvEntry::Multiline { .. }) => {
                return Err(HandlerError::parse(
                    &path,
                    format!("{VERSION_KEY} is a multiline value"),
                ));
            }
        };
        let version = parse_version(&raw)?;

        self.state.set_version(version.clone());
        Ok(Some(version))
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn apply(&mut self, message: &mut CommitMessage) -> HandlerResult<()> {
        let version = update_version(self, message)?;

        let path = self.state.path().to_path_buf();
        let entries = self.content()?;
        upsert(entries, VERSION_KEY, version.to_string());
        write_atomic(&path, &render_env(entries))?;

        info!(path = %path.display(), %version, "updated env file");
        self.reset();
        Ok(())
    }
}

fn read_env(path: &Path) -> HandlerResult<EnvEntries> {
    parse_env(&read_file(path)?).map_err(|reason| HandlerError::parse(path, reason))
}

/// Splits each non-blank line on its first `=`, collecting `KEY<<DELIMITER`
/// blocks up to their delimiter line.
fn parse_env(content: &str) -> Result<EnvEntries, String> {
    let mut entries = Vec::new();
    let mut lines = content.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some((key, delimiter)) = heredoc_header(trimmed) {
            let mut block = vec![line.to_string()];
            loop {
                let Some((_, body)) = lines.next() else {
                    return Err(format!(
                        "line {}: {key} is missing its closing {delimiter:?}",
                        index + 1
                    ));
                };
                block.push(body.to_string());
                if body.trim() == delimiter {
                    break;
                }
            }
            entries.push(EnvEntry::Multiline {
                key: key.to_string(),
                lines: block,
            });
            continue;
        }

        let (key, value) = trimmed
            .split_once('=')
            .ok_or_else(|| format!("line {}: expected KEY=value", index + 1))?;
        entries.push(EnvEntry::var(key, value));
    }

    Ok(entries)
}

/// `NAME<<DELIMITER`, provided no `=` comes before the `<<`.
fn heredoc_header(line: &str) -> Option<(&str, &str)> {
    let (key, delimiter) = line.split_once("<<")?;
    let delimiter = delimiter.trim();
    (!key.is_empty() && !key.contains('=') && !delimiter.is_empty())
        .then_some((key.trim(), delimiter))
}

/// Sets `key` on its last entry and drops earlier entries for the same key,
/// or appends it.
fn upsert(entries: &mut EnvEntries, key: &str, value: String) {
    let Some(last) = entries.iter().rposition(|entry| entry.key() == key) else {
        entries.push(EnvEntry::var(key, value));
        return;
    };

    entries[last] = EnvEntry::var(key, value);
    let mut index = 0;
    entries.retain(|entry| {
        let keep = index == last || entry.key() != key;
        index += 1;
        keep
    });
}

fn render_env(entries: &[EnvEntry]) -> String {
    let mut output = String::new();
    for entry in entries {
        match entry {
            EnvEntry::Var { key, value } => {
                output.push_str(key);
                output.push('=');
                output.push_str(value);
                output.push('\n');
            }
            EnvEntry::Multiline { lines, .. } => {
                for line in lines {
                    output.push_str(line);
                    output.push('\n');
                }
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn handler(temp: &TempDir) -> EnvFileHandler {
        EnvFileHandler::new(temp.path().join("set_env_1234"), &HandlerContext::new())
    }

    #[test]
    fn test_metadata() {
        let temp = TempDir::new().unwrap();
        let handler = handler(&temp);
        assert_eq!(handler.kind(), "env-file");
        assert_eq!(handler.priority(), 5);
        assert!(handler.autocreate());
    }

    #[test]
    fn test_read_pairs() {
        let temp = TempDir::new().unwrap();
        let handler = handler(&temp);
        std::fs::write(handler.path(), "A=1\n\nURL=https://x?a=b\n").unwrap();

        assert_eq!(
            handler.read().unwrap(),
            vec![EnvEntry::var("A", "1"), EnvEntry::var("URL", "https://x?a=b")]
        );
    }

    #[test]
    fn test_read_rejects_line_without_separator() {
        let temp = TempDir::new().unwrap();
        let handler = handler(&temp);
        std::fs::write(handler.path(), "A=1\nbroken\n").unwrap();

        let err = handler.read().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_version() {
        let temp = TempDir::new().unwrap();
        let mut handler = handler(&temp);
        std::fs::write(handler.path(), "SEMANTIC_VERSION=0.4.1\n").unwrap();

        assert_eq!(handler.version().unwrap(), Some(Version::new(0, 4, 1)));
    }

    #[test]
    fn test_update_creates_file() {
        let temp = TempDir::new().unwrap();
        let mut handler = handler(&temp);
        let mut message = CommitMessage::parse("#major #added x");

        handler.update(&mut message).unwrap();

        let content = std::fs::read_to_string(handler.path()).unwrap();
        assert_eq!(content, "SEMANTIC_VERSION=1.0.0\n");
    }

    #[test]
    fn test_update_replaces_existing_key_in_place() {
        let temp = TempDir::new().unwrap();
        let mut handler = handler(&temp);
        std::fs::write(handler.path(), "A=1\nSEMANTIC_VERSION=0.4.1\nB=2\n").unwrap();
        let mut message = CommitMessage::parse("#patch");

        handler.update(&mut message).unwrap();

        let content = std::fs::read_to_string(handler.path()).unwrap();
        assert_eq!(content, "A=1\nSEMANTIC_VERSION=0.4.2\nB=2\n");
    }

    #[test]
    fn test_update_uses_resolved_version() {
        let temp = TempDir::new().unwrap();
        let mut handler = handler(&temp);
        std::fs::write(handler.path(), "A=1\n").unwrap();
        let mut message =
            CommitMessage::parse("#added x").with_semantic_version(Version::new(2, 0, 0));

        handler.update(&mut message).unwrap();

        let content = std::fs::read_to_string(handler.path()).unwrap();
        assert_eq!(content, "A=1\nSEMANTIC_VERSION=2.0.0\n");
    }

    #[test]
    fn test_read_multiline_block() {
        let temp = TempDir::new().unwrap();
        let handler = handler(&temp);
        std::fs::write(
            handler.path(),
            "NOTES<<EOF\nline one\nSEMANTIC_VERSION=9.9.9\nEOF\nA=1\n",
        )
        .unwrap();

        assert_eq!(
            handler.read().unwrap(),
            vec![
                EnvEntry::Multiline {
                    key: "NOTES".to_string(),
                    lines: vec![
                        "NOTES<<EOF".to_string(),
                        "line one".to_string(),
                        "SEMANTIC_VERSION=9.9.9".to_string(),
                        "EOF".to_string(),
                    ],
                },
                EnvEntry::var("A", "1"),
            ]
        );
    }

    #[test]
    fn test_read_unterminated_block() {
        let temp = TempDir::new().unwrap();
        let handler = handler(&temp);
        std::fs::write(handler.path(), "NOTES<<EOF\nline one\n").unwrap();

        let err = handler.read().unwrap_err();
        assert!(err.to_string().contains("closing"));
    }

    #[test]
    fn test_value_with_angle_brackets_is_plain() {
        assert_eq!(heredoc_header("A=x<<y"), None);
        assert_eq!(heredoc_header("NOTES<<EOF"), Some(("NOTES", "EOF")));
    }

    #[test]
    fn test_update_keeps_multiline_block() {
        let temp = TempDir::new().unwrap();
        let mut handler = handler(&temp);
        let existing = "NOTES<<EOF\nline one\n  indented\nEOF\n";
        std::fs::write(handler.path(), existing).unwrap();
        let mut message = CommitMessage::parse("#minor #added x");

        handler.update(&mut message).unwrap();

        let content = std::fs::read_to_string(handler.path()).unwrap();
        assert_eq!(content, format!("{existing}SEMANTIC_VERSION=0.1.0\n"));
    }

    #[test]
    fn test_version_uses_last_occurrence() {
        let temp = TempDir::new().unwrap();
        let mut handler = handler(&temp);
        std::fs::write(
            handler.path(),
            "SEMANTIC_VERSION=0.1.0\nA=1\nSEMANTIC_VERSION=0.3.0\n",
        )
        .unwrap();

        assert_eq!(handler.version().unwrap(), Some(Version::new(0, 3, 0)));
    }

    #[test]
    fn test_update_collapses_duplicate_keys() {
        let temp = TempDir::new().unwrap();
        let mut handler = handler(&temp);
        std::fs::write(
            handler.path(),
            "SEMANTIC_VERSION=0.1.0\nA=1\nSEMANTIC_VERSION=0.3.0\nB=2\n",
        )
        .unwrap();
        let mut message = CommitMessage::parse("#patch");

        handler.update(&mut message).unwrap();

        let content = std::fs::read_to_string(handler.path()).unwrap();
        assert_eq!(content, "A=1\nSEMANTIC_VERSION=0.3.1\nB=2\n");
    }
}
