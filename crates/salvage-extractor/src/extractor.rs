//! Core Extractor implementation

use crate::chunking::TextChunker;
use crate::config::ExtractorConfig;
use crate::content::screen;
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use crate::types::{ChunkOutcome, ChunkReport, ExtractionMetadata, Page, PageExtraction};
use salvage_llm::LlmProvider;
use salvage_recovery::{ArrayRecoverer, RecoveryObserver, TracingObserver};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor turns a page of text into subject-predicate-object triples
pub struct Extractor<L, O = TracingObserver>
where
    L: LlmProvider,
    O: RecoveryObserver,
{
    llm_provider: L,
    recoverer: ArrayRecoverer<O>,
    config: ExtractorConfig,
}

impl<L: LlmProvider> Extractor<L> {
    /// Create a new Extractor that logs recovery through `tracing`
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if `config` is invalid.
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::with_recoverer(llm_provider, config, ArrayRecoverer::new())
    }
}

impl<L, O> Extractor<L, O>
where
    L: LlmProvider,
    O: RecoveryObserver,
{
    /// Create a new Extractor with a custom recovery observer
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if `config` is invalid.
    pub fn with_recoverer(
        llm_provider: L,
        config: ExtractorConfig,
        recoverer: ArrayRecoverer<O>,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            llm_provider,
            recoverer,
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract triples from one page
    ///
    /// Chunks whose response cannot be recovered are reported and skipped.
    ///
    /// # Errors
    ///
    /// - [`ExtractorError::BinaryContent`] / [`ExtractorError::ContentTooShort`] from screening
    /// - [`ExtractorError::Llm`] or [`ExtractorError::Timeout`] from a model call
    /// - [`ExtractorError::NoTriples`] when no chunk yields a triple
    pub async fn extract_page(&self, page: &Page) -> Result<PageExtraction, ExtractorError> {
        let start_time = Instant::now();
        let text = screen(&page.content, &self.config)?;

        let chunker = TextChunker::new(self.config.chunk_strategy, self.config.max_chunk_size);
        let chunks = chunker.chunk(&text);

        info!(
            page = %page.id,
            chars = text.chars().count(),
            chunks = chunks.len(),
            "Starting extraction"
        );

        let mut triples = Vec::new();
        let mut reports = Vec::with_capacity(chunks.len());
        let mut records_rejected = 0;

        for (index, chunk) in chunks.iter().enumerate() {
            debug!(page = %page.id, "Processing chunk {}/{}", index + 1, chunks.len());

            let request = PromptBuilder::new(chunk)
                .with_title(&page.title)
                .with_chunk(index, chunks.len())
                .request();

            let response = timeout(
                self.config.extraction_timeout(),
                self.llm_provider.generate(&request),
            )
            .await
            .map_err(|_| ExtractorError::Timeout(self.config.extraction_timeout_secs))??;

            debug!(page = %page.id, "LLM response length: {} chars", response.len());

            let outcome = match parse_llm_response(&response, &self.recoverer) {
                Ok(parsed) => {
                    records_rejected += parsed.rejected();
                    let outcome = ChunkOutcome::Recovered {
                        strategy: parsed.strategy,
                        records: parsed.records,
                        accepted: parsed.triples.len(),
                    };
                    triples.extend(
                        parsed
                            .triples
                            .into_iter()
                            .map(|triple| triple.with_provenance(page)),
                    );
                    outcome
                }
                Err(e) => {
                    warn!(page = %page.id, chunk = index, error = %e, "Chunk response unrecoverable");
                    ChunkOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            reports.push(ChunkReport {
                index,
                chars: chunk.chars().count(),
                outcome,
            });
        }

        let extraction = PageExtraction {
            triples,
            chunks: reports,
            metadata: ExtractionMetadata {
                model: self.llm_provider.model_name().to_string(),
                processing_time_ms: u64::try_from(start_time.elapsed().as_millis())
                    .unwrap_or(u64::MAX),
                content_chars: text.chars().count(),
                records_rejected,
            },
        };

        if extraction.triples.is_empty() {
            return Err(ExtractorError::NoTriples {
                chunks: extraction.chunks.len(),
                failed_chunks: extraction.failed_chunks(),
            });
        }

        info!(
            page = %page.id,
            triples = extraction.triples.len(),
            failed_chunks = extraction.failed_chunks(),
            "Extraction complete"
        );

        Ok(extraction)
    }
}
