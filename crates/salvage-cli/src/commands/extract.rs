//! Extract command implementation.

use super::{load_pages, ExitStatus};
use crate::cli::BatchArgs;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::output::{shorten, Formatter};
use crate::state::{ExtractionState, Phase};
use crate::store::KnowledgeGraph;
use salvage_extractor::{Extractor, Page};
use salvage_llm::LlmProvider;
use tracing::{info, warn};

/// Execute the extract command: one iteration over the next unsettled pages.
pub async fn execute_extract<L: LlmProvider>(
    args: BatchArgs,
    config: &PipelineConfig,
    llm: L,
    formatter: &Formatter,
) -> Result<ExitStatus> {
    let paths = &config.paths;
    let input = load_pages(&paths.input_file)?;
    let mut state = ExtractionState::load(&paths.state_file)?;
    let mut graph =
        KnowledgeGraph::load_or_new(&paths.output_file, paths.input_file.display().to_string())?;

    let candidates: Vec<&Page> = input.pages.iter().filter(|p| !p.is_duplicate()).collect();
    let pending: Vec<&Page> = candidates
        .iter()
        .copied()
        .filter(|p| !state.is_settled(&p.id))
        .collect();

    println!("{}", formatter.heading("BATCH EXTRACTION"));
    println!("{}", formatter.field("Total pages", candidates.len()));
    println!("{}", formatter.field("Processed", state.processed_ids.len()));
    println!("{}", formatter.field("Failed", state.failed_ids.len()));
    println!("{}", formatter.field("Remaining", pending.len()));
    println!("{}", formatter.field("Total triples so far", state.total_triples));

    if pending.is_empty() {
        state.phase = Phase::Complete;
        state.save(&paths.state_file)?;
        println!("\n{}", formatter.success("Extraction complete"));
        return Ok(ExitStatus::Success);
    }

    let extractor = Extractor::new(llm, config.extraction.clone())?;
    let batch_size = args.pages.unwrap_or(config.batch.pages_per_iteration).max(1);
    let batch: Vec<&Page> = pending.iter().copied().take(batch_size).collect();
    let mut succeeded = 0;

    for (position, page) in batch.iter().enumerate() {
        if position > 0 {
            tokio::time::sleep(config.batch.page_delay()).await;
        }

        println!("\nProcessing {}: {}", page.id, shorten(&page.title, 50));

        match extractor.extract_page(page).await {
            Ok(extraction) => {
                let count = extraction.triples.len();
                graph.add_page(page, extraction.triples);
                state.record_success(&page.id, count);
                succeeded += 1;
                println!("  {}", formatter.success(&format!("{} triples extracted", count)));
            }
            Err(e) => {
                warn!(page = %page.id, error = %e, "Page extraction failed");
                if e.is_permanent() {
                    state.record_skip(&page.id);
                } else {
                    state.record_failure(&page.id);
                }
                println!("  {}", formatter.error(&format!("FAILED: {}", e)));
            }
        }

        state.save(&paths.state_file)?;
        graph.save(&paths.output_file)?;
    }

    let remaining = pending.len() - batch.len();
    info!(succeeded, attempted = batch.len(), remaining, "Iteration finished");

    println!("\n{}", formatter.heading("ITERATION SUMMARY"));
    println!(
        "{}",
        formatter.field("Pages processed this iteration", format!("{}/{}", succeeded, batch.len()))
    );
    println!("{}", formatter.progress(state.processed_ids.len(), candidates.len()));
    println!("{}", formatter.field("Total triples", state.total_triples));

    if remaining > 0 {
        println!(
            "\n{}",
            formatter.warning(&format!("More work needed ({} pages remaining)", remaining))
        );
        return Ok(ExitStatus::Incomplete);
    }

    state.phase = Phase::Complete;
    state.save(&paths.state_file)?;
    println!("\n{}", formatter.success("Extraction complete"));
    Ok(ExitStatus::Success)
}
