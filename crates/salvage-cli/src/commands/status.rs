//! Status command implementation.

use super::{load_pages, ExitStatus};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::output::Formatter;
use crate::state::{ExtractionState, Phase};

/// Counts derived from the input and the checkpoint state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Pages that are not duplicates
    pub total: usize,
    /// Processed pages
    pub processed: usize,
    /// Pages waiting for a retry
    pub failed: usize,
    /// Pages given up on
    pub skipped: usize,
    /// Pages never attempted
    pub remaining: usize,
    /// Triples extracted so far
    pub triples: usize,
}

impl StatusReport {
    /// Build the report for `config`'s input and state files.
    pub fn load(config: &PipelineConfig) -> Result<(Self, ExtractionState)> {
        let input = load_pages(&config.paths.input_file)?;
        let state = ExtractionState::load(&config.paths.state_file)?;

        let candidates: Vec<_> = input.pages.iter().filter(|p| !p.is_duplicate()).collect();
        let report = Self {
            total: candidates.len(),
            processed: state.processed_ids.len(),
            failed: state.failed_ids.len(),
            skipped: state.skipped_ids.len(),
            remaining: candidates.iter().filter(|p| !state.is_settled(&p.id)).count(),
            triples: state.total_triples,
        };
        Ok((report, state))
    }
}

/// Execute the status command.
pub fn execute_status(config: &PipelineConfig, formatter: &Formatter) -> Result<ExitStatus> {
    let (report, state) = StatusReport::load(config)?;

    println!("{}", formatter.heading("EXTRACTION STATUS"));
    let phase = match state.phase {
        Phase::Extracting => "extracting",
        Phase::Complete => "complete",
    };
    println!("{}", formatter.field("Phase", phase));
    println!("{}", formatter.field("Total pages", report.total));
    println!("{}", formatter.field("Processed", report.processed));
    println!("{}", formatter.field("Failed", report.failed));
    println!("{}", formatter.field("Skipped", report.skipped));
    println!("{}", formatter.field("Remaining", report.remaining));
    println!("{}", formatter.field("Total triples", report.triples));
    println!("{}", formatter.progress(report.processed, report.total));
    if let Some(updated) = state.last_updated {
        println!("{}", formatter.field("Last updated", updated.to_rfc3339()));
    }

    Ok(ExitStatus::Success)
}
