//! Handlers command.

use anyhow::{Context, Result};
use clap::Args;

use super::SourceArgs;

/// Arguments for the handlers command.
#[derive(Debug, Args)]
pub struct HandlersArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Runs the handlers command.
pub fn run(args: &HandlersArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config = args.source.load_config(&cwd)?;
    let registry = args.source.load_registry(&config)?;

    let width = registry
        .entries()
        .iter()
        .map(|entry| entry.kind().len())
        .max()
        .unwrap_or(0);

    for entry in registry.entries() {
        println!(
            "{:<width$}  {}  ({})",
            entry.kind(),
            entry.pattern(),
            entry.origin()
        );
    }

    Ok(())
}
