//! Tagged commit messages.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::LazyLock;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use regex::Regex;
use semver::Version;
use tracing::debug;

use crate::version::bump;
use crate::{BumpKind, ChangeCategory, VersionError, VersionResult};

/// Date format used in changelog headings unless configured otherwise.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[A-Za-z0-9]+").expect("invalid tag regex"));

/// A commit message broken down into changelog entries and a bump directive.
///
/// Tags such as `#added` open a changelog section for the text that follows,
/// and `#major`, `#minor` or `#patch` request a version bump:
///
/// ```text
/// #minor #added new exporter #fixed crash on empty input
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    message: String,
    date: DateTime<Utc>,
    changes: BTreeMap<ChangeCategory, Vec<String>>,
    bump: Option<BumpKind>,
    semantic_version: Option<Version>,
}

impl CommitMessage {
    /// Parses a commit message, dated now.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        let message = message.into();
        let (changes, bump) = parse_tags(&message);
        debug!(?bump, sections = changes.len(), "parsed commit message");

        Self {
            message,
            date: Utc::now(),
            changes,
            bump,
            semantic_version: None,
        }
    }

    /// Sets the date rendered in the changelog heading.
    #[must_use]
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Uses `kind` when the message itself carries no bump tag.
    #[must_use]
    pub fn with_default_bump(mut self, kind: BumpKind) -> Self {
        self.ensure_bump(kind);
        self
    }

    /// Seeds the resolved version, e.g. from a previous run.
    #[must_use]
    pub fn with_semantic_version(mut self, version: Version) -> Self {
        self.semantic_version = Some(version);
        self
    }

    /// The raw message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The date rendered in the changelog heading.
    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Changelog entries grouped by category, in rendering order.
    #[must_use]
    pub fn changes(&self) -> &BTreeMap<ChangeCategory, Vec<String>> {
        &self.changes
    }

    /// The pending bump, if any.
    #[must_use]
    pub fn bump(&self) -> Option<BumpKind> {
        self.bump
    }

    /// The version resolved so far in this run.
    #[must_use]
    pub fn semantic_version(&self) -> Option<&Version> {
        self.semantic_version.as_ref()
    }

    /// Sets the resolved version.
    pub fn set_semantic_version(&mut self, version: Version) {
        self.semantic_version = Some(version);
    }

    /// Requests `kind` unless a bump is already pending.
    pub fn ensure_bump(&mut self, kind: BumpKind) {
        self.bump.get_or_insert(kind);
    }

    /// Applies the pending bump to the resolved version and clears it.
    ///
    /// Without a pending bump the resolved version is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Unresolved`] if no version has been resolved.
    /// The pending bump is kept in that case.
    pub fn bump_semantic_version(&mut self) -> VersionResult<Version> {
        let current = self
            .semantic_version
            .as_ref()
            .ok_or(VersionError::Unresolved)?;

        let next = match self.bump.take() {
            Some(kind) => bump(current, kind),
            None => current.clone(),
        };

        self.semantic_version = Some(next.clone());
        Ok(next)
    }

    /// Renders this message as a Keep a Changelog release block.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Unresolved`] if no version has been resolved.
    pub fn markdown(&self) -> VersionResult<String> {
        self.render_markdown(DEFAULT_DATE_FORMAT)
    }

    /// Renders this message as a release block with a custom date format.
    ///
    /// The block ends with exactly one blank line.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Unresolved`] if no version has been resolved,
    /// or [`VersionError::DateFormat`] if `date_format` cannot be rendered.
    pub fn render_markdown(&self, date_format: &str) -> VersionResult<String> {
        let version = self
            .semantic_version
            .as_ref()
            .ok_or(VersionError::Unresolved)?;
        validate_date_format(date_format)?;

        let invalid = |_: std::fmt::Error| VersionError::DateFormat(date_format.to_string());
        let mut output = String::new();
        let date = self.date.format(date_format);
        writeln!(output, "## [{version}] - {date}").map_err(invalid)?;

        for (category, entries) in &self.changes {
            write!(output, "\n### {category}\n\n").map_err(invalid)?;
            for entry in entries {
                writeln!(output, "- {entry}").map_err(invalid)?;
            }
        }

        output.push('\n');
        Ok(output)
    }
}

/// Checks that `format` is a strftime format chrono can render.
///
/// # Errors
///
/// Returns [`VersionError::DateFormat`] if the format has an unknown or
/// incomplete specifier.
pub fn validate_date_format(format: &str) -> VersionResult<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(VersionError::DateFormat(format.to_string()));
    }
    Ok(())
}

/// Walks the message, splitting on `#tag` tokens.
fn parse_tags(message: &str) -> (BTreeMap<ChangeCategory, Vec<String>>, Option<BumpKind>) {
    let mut changes: BTreeMap<ChangeCategory, Vec<String>> = BTreeMap::new();
    let mut bump = None;
    let mut section = None;
    let mut last = 0;

    for tag in TAG_REGEX.find_iter(message) {
        push_entry(&mut changes, section, &message[last..tag.start()]);
        last = tag.end();

        let name = &tag.as_str()[1..];
        if let Some(kind) = BumpKind::from_tag(name) {
            bump = Some(kind);
            section = None;
        } else {
            // Unknown tags close the current section.
            section = ChangeCategory::from_tag(name);
        }
    }
    push_entry(&mut changes, section, &message[last..]);

    (changes, bump)
}

fn push_entry(
    changes: &mut BTreeMap<ChangeCategory, Vec<String>>,
    section: Option<ChangeCategory>,
    text: &str,
) {
    let Some(category) = section else {
        return;
    };

    // A whitespace-only fragment still yields an (empty) entry.
    if !text.is_empty() {
        changes
            .entry(category)
            .or_default()
            .push(text.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entries(message: &CommitMessage, category: ChangeCategory) -> Vec<&str> {
        message
            .changes()
            .get(&category)
            .map(|e| e.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_parse_single_section() {
        let message = CommitMessage::parse("#patch #fixed fixed hello_world.py");
        assert_eq!(message.bump(), Some(BumpKind::Patch));
        assert_eq!(message.changes().len(), 1);
        assert_eq!(
            entries(&message, ChangeCategory::Fixed),
            vec!["fixed hello_world.py"]
        );
    }

    #[test]
    fn test_parse_multiple_sections() {
        let message =
            CommitMessage::parse("#major #added added hello_world.py#removed removed bad vibes");
        assert_eq!(message.bump(), Some(BumpKind::Major));
        assert_eq!(
            entries(&message, ChangeCategory::Added),
            vec!["added hello_world.py"]
        );
        assert_eq!(
            entries(&message, ChangeCategory::Removed),
            vec!["removed bad vibes"]
        );
    }

    #[test]
    fn test_parse_repeated_category_keeps_order() {
        let message = CommitMessage::parse("#added x#added y");
        assert_eq!(message.changes().len(), 1);
        assert_eq!(entries(&message, ChangeCategory::Added), vec!["x", "y"]);
    }

    #[test]
    fn test_parse_updated_alias() {
        let message = CommitMessage::parse("#updated z");
        assert_eq!(message.changes().len(), 1);
        assert_eq!(entries(&message, ChangeCategory::Changed), vec!["z"]);
    }

    #[test]
    fn test_parse_last_bump_wins() {
        let message = CommitMessage::parse("#major #minor #patch");
        assert_eq!(message.bump(), Some(BumpKind::Patch));
        assert!(message.changes().is_empty());
    }

    #[test]
    fn test_parse_bump_closes_section() {
        let message = CommitMessage::parse("#added feature #minor trailing text");
        assert_eq!(entries(&message, ChangeCategory::Added), vec!["feature"]);
        assert_eq!(message.bump(), Some(BumpKind::Minor));
    }

    #[test]
    fn test_parse_unknown_tag_closes_section() {
        let message = CommitMessage::parse("#fixed bug #jira1234 not an entry");
        assert_eq!(entries(&message, ChangeCategory::Fixed), vec!["bug"]);
        assert_eq!(message.bump(), None);
    }

    #[test]
    fn test_parse_tags_case_insensitive() {
        let message = CommitMessage::parse("#MAJOR #Security patched CVE");
        assert_eq!(message.bump(), Some(BumpKind::Major));
        assert_eq!(
            entries(&message, ChangeCategory::Security),
            vec!["patched CVE"]
        );
    }

    #[test]
    fn test_parse_discards_untagged_text() {
        let message = CommitMessage::parse("leading text #added kept");
        assert_eq!(message.changes().len(), 1);
        assert_eq!(entries(&message, ChangeCategory::Added), vec!["kept"]);
    }

    #[test]
    fn test_parse_whitespace_fragment_is_empty_entry() {
        let message = CommitMessage::parse("#added   #fixed real fix");
        assert_eq!(entries(&message, ChangeCategory::Added), vec![""]);
        assert_eq!(entries(&message, ChangeCategory::Fixed), vec!["real fix"]);
    }

    #[test]
    fn test_parse_adjacent_tags_add_nothing() {
        let message = CommitMessage::parse("#added#fixed real fix");
        assert!(!message.changes().contains_key(&ChangeCategory::Added));
        assert_eq!(entries(&message, ChangeCategory::Fixed), vec!["real fix"]);
    }

    #[test]
    fn test_parse_multiline() {
        let message = CommitMessage::parse("#minor\n#added first\n#added second\n");
        assert_eq!(
            entries(&message, ChangeCategory::Added),
            vec!["first", "second"]
        );
    }

    #[test]
    fn test_default_bump_does_not_override_tag() {
        let tagged = CommitMessage::parse("#patch #fixed x").with_default_bump(BumpKind::Minor);
        assert_eq!(tagged.bump(), Some(BumpKind::Patch));

        let untagged = CommitMessage::parse("#fixed x").with_default_bump(BumpKind::Minor);
        assert_eq!(untagged.bump(), Some(BumpKind::Minor));
    }

    #[test]
    fn test_bump_semantic_version_consumes_bump() {
        let mut message =
            CommitMessage::parse("#minor").with_semantic_version(Version::new(1, 2, 3));
        let bumped = message.bump_semantic_version().unwrap();

        assert_eq!(bumped, Version::new(1, 3, 0));
        assert_eq!(message.bump(), None);

        // A second call has nothing left to apply.
        let again = message.bump_semantic_version().unwrap();
        assert_eq!(again, Version::new(1, 3, 0));
    }

    #[test]
    fn test_bump_semantic_version_unresolved() {
        let mut message = CommitMessage::parse("#major");
        let err = message.bump_semantic_version().unwrap_err();
        assert!(matches!(err, VersionError::Unresolved));
        assert_eq!(message.bump(), Some(BumpKind::Major));
    }

    #[test]
    fn test_markdown() {
        let date = Utc.with_ymd_and_hms(2024, 6, 24, 12, 2, 11).unwrap();
        let message = CommitMessage::parse(
            "#added added hello_world.py #added better vibes #removed removed bad vibes",
        )
        .with_date(date)
        .with_semantic_version(Version::new(0, 1, 1));

        assert_eq!(
            message.markdown().unwrap(),
            "## [0.1.1] - 2024-06-24\n\n\
             ### Added\n\n\
             - added hello_world.py\n\
             - better vibes\n\n\
             ### Removed\n\n\
             - removed bad vibes\n\n"
        );
    }

    #[test]
    fn test_markdown_fixed_section_order() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let message = CommitMessage::parse("#security s #added a #fixed f")
            .with_date(date)
            .with_semantic_version(Version::new(1, 0, 0));
        let markdown = message.markdown().unwrap();

        let added = markdown.find("### Added").unwrap();
        let fixed = markdown.find("### Fixed").unwrap();
        let security = markdown.find("### Security").unwrap();
        assert!(added < fixed && fixed < security);
    }

    #[test]
    fn test_markdown_custom_date_format() {
        let date = Utc.with_ymd_and_hms(2024, 6, 24, 12, 2, 11).unwrap();
        let message = CommitMessage::parse("#fixed x")
            .with_date(date)
            .with_semantic_version(Version::new(2, 0, 0));

        let markdown = message.render_markdown("%Y/%m/%d %H:%M:%S").unwrap();
        assert!(markdown.starts_with("## [2.0.0] - 2024/06/24 12:02:11\n"));
    }

    #[test]
    fn test_markdown_without_changes() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let message = CommitMessage::parse("#patch")
            .with_date(date)
            .with_semantic_version(Version::new(0, 0, 1));
        assert_eq!(message.markdown().unwrap(), "## [0.0.1] - 2024-01-01\n\n");
    }

    #[test]
    fn test_markdown_rejects_invalid_date_format() {
        let message = CommitMessage::parse("#fixed x").with_semantic_version(Version::new(1, 0, 0));

        let err = message.render_markdown("%Q").unwrap_err();
        assert!(matches!(err, VersionError::DateFormat(ref format) if format == "%Q"));
        assert!(message.render_markdown("%Y-%").is_err());
    }

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date_format(DEFAULT_DATE_FORMAT).is_ok());
        assert!(validate_date_format("%d/%m/%Y %H:%M").is_ok());
        assert!(validate_date_format("%Q").is_err());
    }

    #[test]
    fn test_markdown_requires_version() {
        let message = CommitMessage::parse("#added x");
        assert!(matches!(message.markdown(), Err(VersionError::Unresolved)));
    }

    #[test]
    fn test_message_preserved() {
        let message = CommitMessage::parse("#added x");
        assert_eq!(message.message(), "#added x");
    }
}
