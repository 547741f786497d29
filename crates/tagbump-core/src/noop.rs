//! Detection of commit messages that must not touch any file.

use std::fmt;

/// Why a commit message is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The message has no `#` at all.
    NoTags,
    /// The message contains `#ignore`.
    IgnoreTag,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTags => write!(f, "no tags"),
            Self::IgnoreTag => write!(f, "#ignore"),
        }
    }
}

const IGNORE_TAG: &str = "#ignore";

/// Returns why `message` is a no-op, or `None` if it should be applied.
#[must_use]
pub fn ignore_reason(message: &str) -> Option<IgnoreReason> {
    if !message.contains('#') {
        return Some(IgnoreReason::NoTags);
    }
    if message.to_lowercase().contains(IGNORE_TAG) {
        return Some(IgnoreReason::IgnoreTag);
    }
    None
}

/// Whether `message` must be ignored.
#[must_use]
pub fn is_noop(message: &str) -> bool {
    ignore_reason(message).is_some()
}
