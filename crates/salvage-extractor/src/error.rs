//! Error types for the Extractor

use salvage_llm::LlmError;
use salvage_recovery::RecoveryError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Page content is too short to be worth a model call
    #[error("Content too short: {length} chars (min: {min})")]
    ContentTooShort {
        /// Trimmed content length
        length: usize,
        /// Configured minimum
        min: usize,
    },

    /// Page content is a binary document scraped as text
    #[error("Binary content")]
    BinaryContent,

    /// Extraction timeout
    #[error("Extraction timeout after {0}s")]
    Timeout(u64),

    /// No JSON array could be recovered from the model response
    #[error("Recovery failed: {0}")]
    Recovery(#[from] RecoveryError),

    /// Every chunk was processed but no valid triple came back
    #[error("No triples extracted ({failed_chunks} of {chunks} chunks failed)")]
    NoTriples {
        /// Chunks sent to the model
        chunks: usize,
        /// Chunks whose response could not be recovered
        failed_chunks: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether retrying the page can never succeed
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ExtractorError::BinaryContent | ExtractorError::ContentTooShort { .. }
        )
    }
}
