//! Retry command implementation.

use super::{load_pages, ExitStatus};
use crate::cli::BatchArgs;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::output::{shorten, Formatter};
use crate::state::ExtractionState;
use crate::store::KnowledgeGraph;
use salvage_extractor::{is_binary_content, Extractor, Page};
use salvage_llm::LlmProvider;
use std::collections::HashMap;
use tracing::{info, warn};

/// Execute the retry command: reprocess failed pages with the retry settings.
///
/// `llm` should already carry the `[retry]` overrides; see
/// [`RetrySettings::chat_config`](crate::config::RetrySettings::chat_config).
pub async fn execute_retry<L: LlmProvider>(
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

    let pages_by_id: HashMap<&str, &Page> =
        input.pages.iter().map(|p| (p.id.as_str(), p)).collect();

    println!("{}", formatter.heading("RETRY FAILED PAGES"));
    println!("{}", formatter.field("Model", llm.model_name()));

    let mut retryable = Vec::new();
    let mut skipped = 0;
    for id in state.failed_ids.clone() {
        match pages_by_id.get(id.as_str()) {
            Some(page) if !is_binary_content(&page.content) => retryable.push(*page),
            Some(_) => {
                state.record_skip(&id);
                skipped += 1;
            }
            None => {
                warn!(page = %id, "Failed page is missing from the input, skipping it");
                state.record_skip(&id);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        println!(
            "{}",
            formatter.info(&format!("Skipped {} pages that can never succeed", skipped))
        );
    }
    println!("{}", formatter.field("Failed pages to retry", retryable.len()));
    println!("{}", formatter.field("Already processed", state.processed_ids.len()));
    println!("{}", formatter.field("Total triples so far", state.total_triples));

    if retryable.is_empty() {
        state.save(&paths.state_file)?;
        println!("\n{}", formatter.success("No failed pages to retry"));
        return Ok(ExitStatus::Success);
    }

    let extractor = Extractor::new(llm, config.retry.extractor_config(&config.extraction))?;
    let batch_size = args.pages.unwrap_or(config.retry.pages_per_iteration).max(1);
    let batch: Vec<&Page> = retryable.into_iter().take(batch_size).collect();
    let mut succeeded = 0;

    for (position, page) in batch.iter().enumerate() {
        if position > 0 {
            tokio::time::sleep(config.batch.page_delay()).await;
        }

        println!(
            "\nRetrying {}: {} ({} chars)",
            page.id,
            shorten(&page.title, 60),
            page.content.chars().count()
        );

        match extractor.extract_page(page).await {
            Ok(extraction) => {
                let count = extraction.triples.len();
                graph.add_page(page, extraction.triples);
                state.record_success(&page.id, count);
                succeeded += 1;
                println!("  {}", formatter.success(&format!("{} triples extracted", count)));
            }
            Err(e) if e.is_permanent() => {
                state.record_skip(&page.id);
                println!("  {}", formatter.warning(&format!("SKIPPED: {}", e)));
            }
            Err(e) => {
                warn!(page = %page.id, error = %e, "Retry failed");
                // Back of the queue, so the next run tries another page
                state.record_failure(&page.id);
                println!("  {}", formatter.error(&format!("FAILED AGAIN: {}", e)));
            }
        }

        state.save(&paths.state_file)?;
        graph.save(&paths.output_file)?;
    }

    let remaining_failed = state.failed_ids.len();
    info!(succeeded, attempted = batch.len(), remaining_failed, "Retry iteration finished");

    println!("\n{}", formatter.heading("RETRY SUMMARY"));
    println!(
        "{}",
        formatter.field("This iteration", format!("{}/{} succeeded", succeeded, batch.len()))
    );
    println!("{}", formatter.field("Total processed", state.processed_ids.len()));
    println!("{}", formatter.field("Remaining failed", remaining_failed));
    println!("{}", formatter.field("Total triples", state.total_triples));

    if remaining_failed > 0 {
        println!(
            "\n{}",
            formatter.warning(&format!("{} failed pages remaining", remaining_failed))
        );
        return Ok(ExitStatus::Incomplete);
    }

    println!("\n{}", formatter.success("All retries complete"));
    Ok(ExitStatus::Success)
}
