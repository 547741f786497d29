//! Commit message types for tagbump.
//!
//! This crate provides the types every other tagbump crate builds on:
//! - [`CommitMessage`]: A tagged commit message broken down into changelog entries
//! - [`ChangeCategory`]: The Keep a Changelog section an entry belongs to
//! - [`BumpKind`]: The version component a message asks to increment
//! - [`bump`] / [`bump_version`]: The semantic version engine

mod category;
mod message;
mod version;

pub use category::{BumpKind, ChangeCategory};
pub use message::{CommitMessage, DEFAULT_DATE_FORMAT, validate_date_format};
pub use version::{
    DEFAULT_VERSION, VersionError, VersionResult, bump, bump_version, parse_version,
};
