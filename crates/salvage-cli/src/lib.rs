//! Salvage CLI library.
//!
//! Checkpointed batch extraction over a page collection: configuration,
//! checkpoint state, the knowledge-graph output file and the command
//! implementations behind the `salvage` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod files;
pub mod output;
pub mod state;
pub mod store;

pub use cli::{BatchArgs, Cli, Command, RecoverArgs};
pub use commands::ExitStatus;
pub use config::PipelineConfig;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use state::{ExtractionState, Phase};
pub use store::KnowledgeGraph;
