//! CLI command implementations.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tagbump_config::{Config, load_config, load_or_default};
use tagbump_core::default_registry;
use tagbump_registry::{HANDLER_PATH_ENV, HandlerRegistry, search_paths};
use tracing::debug;

pub mod handlers;
pub mod init;
pub mod preview;
pub mod update;

/// Where configuration and handler definitions come from.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Configuration file (defaults to the nearest tagbump.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Extra handler definition directories, separated like PATH
    #[arg(long, env = HANDLER_PATH_ENV)]
    pub handler_path: Option<OsString>,
}

impl SourceArgs {
    /// Loads the explicit configuration file, or searches upwards from `dir`.
    pub fn load_config(&self, dir: &Path) -> Result<Config> {
        match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load {}", path.display())),
            None => load_or_default(dir).context("failed to load configuration"),
        }
    }

    /// Builds the registry: built-in handlers, then every definition found on
    /// the search path.
    pub fn load_registry(&self, config: &Config) -> Result<HandlerRegistry> {
        let mut registry = default_registry().context("failed to register built-in handlers")?;
        let dirs = search_paths(&config.handlers.paths, self.handler_path.as_deref());
        let loaded = registry
            .load_definitions(dirs.as_slice())
            .context("failed to load handler definitions")?;
        debug!(loaded, dirs = dirs.len(), "handler definitions loaded");
        Ok(registry)
    }
}
