//! Dry-run rendering of a commit message.

use semver::Version;
use tagbump_commit::{BumpKind, CommitMessage, DEFAULT_VERSION};

use crate::CoreResult;

/// What applying a commit message would produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Bump requested by the message (or the configured default).
    pub bump: Option<BumpKind>,
    /// Version the run would resolve to.
    pub version: Version,
    /// Changelog block the run would insert.
    pub markdown: String,
}

/// Resolves `message` against `base` without touching any file.
///
/// Without a base version the same default as a real run applies: `0.0.0`
/// with a minor bump unless the message asks for another one.
///
/// # Errors
///
/// Returns an error if the release block cannot be rendered.
pub fn preview(
    message: &str,
    base: Option<Version>,
    default_bump: Option<BumpKind>,
    date_format: &str,
) -> CoreResult<Preview> {
    let mut message = CommitMessage::parse(message);
    if let Some(kind) = default_bump {
        message = message.with_default_bump(kind);
    }
    let bump = message.bump();

    if let Some(base) = base {
        message.set_semantic_version(base);
    } else {
        message.set_semantic_version(DEFAULT_VERSION);
        message.ensure_bump(BumpKind::Minor);
    }

    let version = message.bump_semantic_version()?;
    let markdown = message.render_markdown(date_format)?;

    Ok(Preview {
        bump,
        version,
        markdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_with_base() {
        let preview = preview(
            "#major #removed old api",
            Some(Version::new(1, 4, 2)),
            None,
            "%Y",
        )
        .unwrap();

        assert_eq!(preview.bump, Some(BumpKind::Major));
        assert_eq!(preview.version, Version::new(2, 0, 0));
        assert!(preview.markdown.starts_with("## [2.0.0] - "));
        assert!(preview.markdown.contains("### Removed\n\n- old api\n"));
    }

    #[test]
    fn test_preview_without_base_defaults_to_minor() {
        let preview = preview("#added x", None, None, "%Y-%m-%d").unwrap();
        assert_eq!(preview.bump, None);
        assert_eq!(preview.version, Version::new(0, 1, 0));
    }

    #[test]
    fn test_preview_default_bump() {
        let preview = preview(
            "#fixed x",
            Some(Version::new(1, 0, 0)),
            Some(BumpKind::Patch),
            "%Y-%m-%d",
        )
        .unwrap();
        assert_eq!(preview.bump, Some(BumpKind::Patch));
        assert_eq!(preview.version, Version::new(1, 0, 1));
    }

    #[test]
    fn test_preview_message_bump_overrides_default() {
        let preview = preview(
            "#minor #fixed x",
            Some(Version::new(1, 0, 0)),
            Some(BumpKind::Patch),
            "%Y-%m-%d",
        )
        .unwrap();
        assert_eq!(preview.version, Version::new(1, 1, 0));
    }
}
