//! Initialize command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tagbump_config::{CONFIG_FILE_NAME, Config};

/// Arguments for the init command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to write the configuration into
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

/// Runs the init command.
pub fn run(args: &InitArgs) -> Result<()> {
    let path = args.dir.join(CONFIG_FILE_NAME);

    if path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let content = toml::to_string_pretty(&Config::default())
        .context("failed to serialize default configuration")?;
    std::fs::write(&path, format!("# tagbump configuration\n\n{content}"))
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Created {}", path.display());
    Ok(())
}
