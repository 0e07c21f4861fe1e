//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod logging;
pub mod output;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use output::OutputFormat;

/// vaultpress - export an Obsidian vault as a static-site markdown tree
#[derive(Parser, Debug)]
#[command(name = "vaultpress", version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/vaultpress/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export changed notes and assets into the export directory
    Export(ExportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Vault root, or a single note inside it
    #[arg(long)]
    pub vault: Option<PathBuf>,

    /// Export root
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Shared db directory, mirrored to <export>/../../db
    #[arg(long)]
    pub db_dir: Option<PathBuf>,

    /// Export only this note (relative to the vault root or absolute)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
