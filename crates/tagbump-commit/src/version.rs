//! Semantic version engine.

use semver::{BuildMetadata, Prerelease, Version};
use thiserror::Error;
use tracing::debug;

use crate::BumpKind;

/// Version used when no file provides one.
pub const DEFAULT_VERSION: Version = Version::new(0, 0, 0);

/// Errors raised while resolving or bumping a version.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The string is not a `major.minor.patch` semantic version.
    #[error("invalid semantic version {version:?}: {reason}")]
    Invalid { version: String, reason: String },

    /// A bump was requested before any version was resolved.
    #[error("no semantic version resolved for this commit message")]
    Unresolved,

    /// A release date format chrono cannot render.
    #[error("invalid release date format {0:?}")]
    DateFormat(String),
}

/// Result type for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Increments the component selected by `kind` and zeroes every
/// less significant component.
///
/// Pre-release and build metadata are dropped.
#[must_use]
pub fn bump(version: &Version, kind: BumpKind) -> Version {
    let mut parts = [version.major, version.minor, version.patch];
    let index = kind.index();

    parts[index] += 1;
    for part in &mut parts[index + 1..] {
        *part = 0;
    }

    let mut bumped = Version::new(parts[0], parts[1], parts[2]);
    bumped.pre = Prerelease::EMPTY;
    bumped.build = BuildMetadata::EMPTY;

    debug!(from = %version, to = %bumped, bump = %kind, "bumped semantic version");
    bumped
}

/// Parses `version` and applies [`bump`].
///
/// # Errors
///
/// Returns [`VersionError::Invalid`] if `version` is not a semantic version.
pub fn bump_version(version: &str, kind: BumpKind) -> VersionResult<Version> {
    let parsed = parse_version(version)?;
    Ok(bump(&parsed, kind))
}

/// Parses a semantic version, trimming surrounding whitespace.
///
/// # Errors
///
/// Returns [`VersionError::Invalid`] if `version` is not a semantic version.
pub fn parse_version(version: &str) -> VersionResult<Version> {
    Version::parse(version.trim()).map_err(|e| VersionError::Invalid {
        version: version.to_string(),
        reason: e.to_string(),
    })
}
