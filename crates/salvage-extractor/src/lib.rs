//! Salvage Extractor
//!
//! Turns scraped pages into subject-predicate-object triples using an LLM.
//!
//! # Architecture
//!
//! ```text
//! Page → screen → chunk → prompt → LLM → recover → filter → Triples
//! ```
//!
//! - Pages that are too short or look like binary documents are rejected
//!   before any model call.
//! - Each model response goes through the recovery cascade from
//!   `salvage-recovery`; only records with `subject`, `predicate` and
//!   `object` become triples.
//! - Every triple is stamped with the page it came from.
//!
//! # Example Usage
//!
//! ```no_run
//! use salvage_extractor::{Extractor, ExtractorConfig, Page};
//! use salvage_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"[{"subject":"Flu","predicate":"causes","object":"fever"}]"#);
//! let extractor = Extractor::new(llm, ExtractorConfig::default())?;
//!
//! let page = Page {
//!     id: "nhs-0001".to_string(),
//!     content: "Flu is a common infectious viral illness spread by coughs and sneezes.".to_string(),
//!     ..Page::default()
//! };
//!
//! let result = extractor.extract_page(&page).await?;
//! println!("Extracted {} triples", result.triples.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod content;
mod error;
mod extractor;
mod parser;
mod prompt;
mod types;

pub use chunking::TextChunker;
pub use config::{ChunkStrategy, ExtractorConfig};
pub use content::{is_binary_content, screen, truncate_words};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::{parse_llm_response, ParsedResponse};
pub use prompt::{PromptBuilder, SYSTEM_PROMPT};
pub use types::{
    ChunkOutcome, ChunkReport, ExtractionMetadata, Page, PageExtraction, PageSet, Triple,
};
