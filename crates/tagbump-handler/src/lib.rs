//! File handler contract for tagbump.
//!
//! This crate provides the pieces every file handler builds on:
//! - [`FileHandler`]: The capability contract implemented per file kind
//! - [`update_version`]: Shared version resolution used by every handler
//! - [`ensure_exists`]: The auto-create policy applied before updates
//! - [`HandlerState`]: Lazily loaded content and version caches
//! - [`HandlerContext`]: Run-wide inputs handlers must not read from the environment

mod context;
mod error;
mod fs;
mod handler;
mod state;

pub use context::HandlerContext;
pub use error::{HandlerError, HandlerResult};
pub use fs::{parent_dir_name, read_file, write_atomic};
pub use handler::{DEFAULT_PRIORITY, FileHandler, ensure_exists, update_version};
pub use state::HandlerState;
