//! vaultpress - incremental export of an Obsidian vault to a static-site markdown tree

pub mod cache;
pub mod cli;
pub mod export;
pub mod infra;
pub mod links;

use anyhow::Result;
use clap::Parser;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{handle_completions, handle_export},
    logging,
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    logging::init(&config.log_level(cli.verbose), config.log_file.as_deref())?;
    let verbose = cli.verbose > 0;

    match &cli.command {
        Command::Export(args) => handle_export(args, &config, verbose),
        Command::Completions(args) => handle_completions(args),
    }
}
