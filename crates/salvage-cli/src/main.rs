//! Salvage CLI - batch knowledge-graph extraction with resilient JSON recovery.

use clap::Parser;
use salvage_cli::commands;
use salvage_cli::{Cli, Command, ExitStatus, Formatter, PipelineConfig};
use salvage_llm::ChatProvider;
use tracing_subscriber::EnvFilter;

/// Exit code for configuration, input and I/O failures.
const FATAL_EXIT_CODE: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli).await {
        Ok(status) => status.code(),
        Err(e) => {
            eprintln!("Error: {}", e);
            FATAL_EXIT_CODE
        }
    };
    std::process::exit(code);
}

/// Log to stderr so stdout stays clean for JSON output.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> salvage_cli::Result<ExitStatus> {
    let formatter = Formatter::new(!cli.no_color);
    let load_config = || -> salvage_cli::Result<PipelineConfig> {
        Ok(PipelineConfig::load(&cli.config)?.with_api_key(cli.api_key.clone()))
    };

    match cli.command {
        Command::Extract(args) => {
            let config = load_config()?;
            let llm = ChatProvider::new(config.llm.clone())?;
            commands::execute_extract(args, &config, llm, &formatter).await
        }
        Command::Retry(args) => {
            let config = load_config()?;
            let llm = ChatProvider::new(config.retry.chat_config(&config.llm))?;
            commands::execute_retry(args, &config, llm, &formatter).await
        }
        Command::Recover(args) => commands::execute_recover(args, &formatter),
        Command::Status => commands::execute_status(&load_config()?, &formatter),
    }
}
