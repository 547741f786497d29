//! Preview command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use semver::Version;
use tagbump_core::{ignore_reason, preview};

/// Arguments for the preview command.
#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Commit message to preview
    #[arg(short, long)]
    pub message: String,

    /// Current version (defaults to a first release)
    #[arg(long)]
    pub version: Option<Version>,

    /// Configuration file (defaults to the nearest tagbump.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Runs the preview command.
pub fn run(args: &PreviewArgs) -> Result<()> {
    if let Some(reason) = ignore_reason(&args.message) {
        println!("Ignoring commit ({reason}): {}", args.message);
        return Ok(());
    }

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config = match &args.config {
        Some(path) => tagbump_config::load_config(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => tagbump_config::load_or_default(&cwd).context("failed to load configuration")?,
    };

    let preview = preview(
        &args.message,
        args.version.clone(),
        config.version.default_bump,
        &config.changelog.date_format,
    )?;

    match preview.bump {
        Some(bump) => println!("Bump: {bump}"),
        None => println!("Bump: none"),
    }
    println!("Version: {}", preview.version);
    println!();
    print!("{}", preview.markdown);

    Ok(())
}
