//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Salvage - extract knowledge-graph triples from scraped pages with a local LLM.
#[derive(Debug, Parser)]
#[command(name = "salvage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// API key for the chat completions endpoint
    #[arg(long, global = true, env = "SALVAGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract triples from the next batch of pages
    Extract(BatchArgs),

    /// Reprocess failed pages with the retry settings
    Retry(BatchArgs),

    /// Recover a JSON array from a saved model response
    Recover(RecoverArgs),

    /// Show extraction progress
    Status,
}

/// Arguments for the extract and retry commands.
#[derive(Debug, Default, Parser)]
pub struct BatchArgs {
    /// Pages to process this run (overrides the configured batch size)
    #[arg(short = 'n', long)]
    pub pages: Option<usize>,
}

/// Arguments for the recover command.
#[derive(Debug, Default, Parser)]
pub struct RecoverArgs {
    /// File holding the response; reads stdin when omitted or `-`
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Print the records on a single line
    #[arg(long)]
    pub compact: bool,
}
