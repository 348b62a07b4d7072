//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text chunking strategy for long pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Split by paragraphs (double newlines)
    #[default]
    ByParagraph,
    /// Split by sections (markdown headers or numbered sections)
    BySection,
    /// Split at sentence boundaries by size
    BySentence,
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Pages with less trimmed content than this are rejected (characters)
    pub min_content_chars: usize,

    /// Truncate page content to this many words before chunking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_content_words: Option<usize>,

    /// Reject pages that look like binary documents scraped as text
    pub skip_binary: bool,

    /// Text chunking strategy for long pages
    pub chunk_strategy: ChunkStrategy,

    /// Maximum chunk size (characters)
    pub max_chunk_size: usize,

    /// Maximum time for a single LLM call, including retries (seconds)
    pub extraction_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_size == 0 {
            return Err("max_chunk_size must be greater than 0".to_string());
        }
        if self.max_content_words == Some(0) {
            return Err("max_content_words must be greater than 0 when set".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration: whole pages, chunked by paragraph
    fn default() -> Self {
        Self {
            min_content_chars: 50,
            max_content_words: None,
            skip_binary: true,
            chunk_strategy: ChunkStrategy::ByParagraph,
            max_chunk_size: 4_000,
            extraction_timeout_secs: 1_200,
        }
    }
}

impl ExtractorConfig {
    /// Quick preset: a short excerpt of each page in a single chunk
    pub fn quick() -> Self {
        Self {
            max_content_words: Some(150),
            max_chunk_size: 2_000,
            extraction_timeout_secs: 300,
            ..Self::default()
        }
    }

    /// Lenient preset: larger section-based chunks and long timeouts
    pub fn lenient() -> Self {
        Self {
            chunk_strategy: ChunkStrategy::BySection,
            max_chunk_size: 8_000,
            extraction_timeout_secs: 2_400,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
        assert!(ExtractorConfig::quick().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_chunk_size() {
        let config = ExtractorConfig {
            max_chunk_size: 0,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_word_limit() {
        let config = ExtractorConfig {
            max_content_words: Some(0),
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml(
            r#"
            chunk_strategy = "by_sentence"
            max_content_words = 150
            "#,
        )
        .unwrap();

        assert_eq!(config.chunk_strategy, ChunkStrategy::BySentence);
        assert_eq!(config.max_content_words, Some(150));
        assert_eq!(config.min_content_chars, 50);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::lenient();
        let parsed = ExtractorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
