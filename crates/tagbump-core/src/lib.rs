//! Core library for tagbump.
//!
//! This crate wires the built-in handlers into a registry and runs a commit
//! message through every handler responsible for a set of files.

mod builtin;
mod error;
mod export;
mod noop;
mod preview;
mod updater;

pub use builtin::{default_registry, register_builtin_handlers};
pub use error::{CoreError, CoreResult};
pub use export::export_version;
pub use noop::{IgnoreReason, ignore_reason, is_noop};
pub use preview::{Preview, preview};
pub use updater::{HandlerFailure, RunOutcome, RunReport, Updater};
