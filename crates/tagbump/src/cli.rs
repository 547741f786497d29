//! CLI definition.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Apply tagged commit messages to changelogs, manifests and CI env files.
#[derive(Debug, Parser)]
#[command(name = "tagbump")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply a commit message to the files of a directory
    Update(commands::update::UpdateArgs),

    /// Show what a commit message would produce without writing files
    Preview(commands::preview::PreviewArgs),

    /// List registered handlers
    Handlers(commands::handlers::HandlersArgs),

    /// Write a default tagbump.toml
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Runs the CLI command.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Update(args) => commands::update::run(args),
            Commands::Preview(args) => commands::preview::run(&args),
            Commands::Handlers(args) => commands::handlers::run(&args),
            Commands::Init(args) => commands::init::run(&args),
        }
    }
}
