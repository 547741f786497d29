//! Configuration schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tagbump_commit::{BumpKind, DEFAULT_DATE_FORMAT, validate_date_format};

use crate::{ConfigError, ConfigResult};

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Version configuration.
    #[serde(default)]
    pub version: VersionConfig,

    /// Changelog configuration.
    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// Handler configuration.
    #[serde(default)]
    pub handlers: HandlersConfig,
}

impl Config {
    /// Checks values serde cannot validate on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the changelog date format is not a
    /// valid strftime format.
    pub fn validate(&self) -> ConfigResult<()> {
        let format = &self.changelog.date_format;
        validate_date_format(format).map_err(|_| {
            ConfigError::Invalid(format!(
                "changelog.date_format {format:?} is not a valid strftime format"
            ))
        })
    }
}

/// Version configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionConfig {
    /// Bump applied when a commit message carries no bump tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bump: Option<BumpKind>,
}

/// Changelog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangelogConfig {
    /// Changelog path, relative to the updated directory.
    #[serde(default = "default_changelog_path")]
    pub path: PathBuf,

    /// strftime format for release dates.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            path: default_changelog_path(),
            date_format: default_date_format(),
        }
    }
}

fn default_changelog_path() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

/// Handler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlersConfig {
    /// Directories searched for handler definition files.
    ///
    /// Relative entries are resolved against the directory holding the
    /// configuration file.
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Abort the run at the first handler failure.
    #[serde(default)]
    pub strict: bool,
}
