//! Change categories and bump kinds recognized in commit tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Changelog section, as defined by [Keep a Changelog](https://keepachangelog.com/).
///
/// The declaration order is the order sections are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    /// New features.
    Added,
    /// Changes in existing functionality.
    Changed,
    /// Soon-to-be removed features.
    Deprecated,
    /// Removed features.
    Removed,
    /// Bug fixes.
    Fixed,
    /// Vulnerability fixes.
    Security,
}

impl ChangeCategory {
    /// All categories in rendering order.
    pub const ALL: [Self; 6] = [
        Self::Added,
        Self::Changed,
        Self::Deprecated,
        Self::Removed,
        Self::Fixed,
        Self::Security,
    ];

    /// Resolves a tag name (without `#`) to a category.
    ///
    /// Matching is case-insensitive. `updated` is an alias of [`Self::Changed`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "added" => Some(Self::Added),
            "changed" | "updated" => Some(Self::Changed),
            "deprecated" => Some(Self::Deprecated),
            "removed" => Some(Self::Removed),
            "fixed" => Some(Self::Fixed),
            "security" => Some(Self::Security),
            _ => None,
        }
    }

    /// Returns the section heading text (e.g. "Added").
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Changed => "Changed",
            Self::Deprecated => "Deprecated",
            Self::Removed => "Removed",
            Self::Fixed => "Fixed",
            Self::Security => "Security",
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic version component to increment.
///
/// Ordered by significance; [`BumpKind::index`] is the position of the
/// component inside `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    /// Breaking changes.
    Major,
    /// New features.
    Minor,
    /// Bug fixes.
    Patch,
}

impl BumpKind {
    /// Resolves a tag name (without `#`) to a bump kind, case-insensitively.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "major" => Some(Self::Major),
            "minor" => Some(Self::Minor),
            "patch" => Some(Self::Patch),
            _ => None,
        }
    }

    /// Index of the version component this bump increments.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Major => 0,
            Self::Minor => 1,
            Self::Patch => 2,
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_tag() {
        assert_eq!(ChangeCategory::from_tag("added"), Some(ChangeCategory::Added));
        assert_eq!(ChangeCategory::from_tag("FIXED"), Some(ChangeCategory::Fixed));
        assert_eq!(
            ChangeCategory::from_tag("Security"),
            Some(ChangeCategory::Security)
        );
        assert_eq!(ChangeCategory::from_tag("unknown"), None);
    }

    #[test]
    fn test_updated_is_changed_alias() {
        assert_eq!(
            ChangeCategory::from_tag("updated"),
            Some(ChangeCategory::Changed)
        );
        assert_eq!(
            ChangeCategory::from_tag("changed"),
            Some(ChangeCategory::Changed)
        );
    }

    #[test]
    fn test_category_order_matches_all() {
        let mut sorted = ChangeCategory::ALL;
        sorted.sort();
        assert_eq!(sorted, ChangeCategory::ALL);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ChangeCategory::Deprecated.to_string(), "Deprecated");
        assert_eq!(ChangeCategory::Removed.name(), "Removed");
    }

    #[test]
    fn test_bump_from_tag() {
        assert_eq!(BumpKind::from_tag("major"), Some(BumpKind::Major));
        assert_eq!(BumpKind::from_tag("Minor"), Some(BumpKind::Minor));
        assert_eq!(BumpKind::from_tag("PATCH"), Some(BumpKind::Patch));
        assert_eq!(BumpKind::from_tag("added"), None);
    }

    #[test]
    fn test_bump_index() {
        assert_eq!(BumpKind::Major.index(), 0);
        assert_eq!(BumpKind::Minor.index(), 1);
        assert_eq!(BumpKind::Patch.index(), 2);
        assert!(BumpKind::Major < BumpKind::Patch);
    }

    #[test]
    fn test_bump_display() {
        assert_eq!(BumpKind::Major.to_string(), "major");
        assert_eq!(BumpKind::Minor.to_string(), "minor");
        assert_eq!(BumpKind::Patch.to_string(), "patch");
    }

    #[test]
    fn test_bump_deserialize() {
        let bump: BumpKind = serde_json::from_str("\"minor\"").unwrap();
        assert_eq!(bump, BumpKind::Minor);
    }
}
