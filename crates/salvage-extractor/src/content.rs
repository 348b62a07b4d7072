//! Page content screening and truncation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;

/// How many leading characters are inspected for binary content
const BINARY_PROBE_CHARS: usize = 200;

/// More non-printable characters than this in the probe marks content as binary
const BINARY_THRESHOLD: usize = 20;

/// Whether scraped text is really a binary document (zip/docx/xlsx or similar)
pub fn is_binary_content(content: &str) -> bool {
    if content.starts_with("PK") {
        return true;
    }

    let non_printable = content
        .chars()
        .take(BINARY_PROBE_CHARS)
        .filter(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        .count();
    non_printable > BINARY_THRESHOLD
}

/// Keep the first `max_words` whitespace-separated words, marking the cut with `...`
pub fn truncate_words(content: &str, max_words: usize) -> String {
    let words: Vec<&str> = content.split_whitespace().collect();
    if words.len() <= max_words {
        return content.to_string();
    }
    format!("{}...", words[..max_words].join(" "))
}

/// Check page content against `config` and return the text to extract from
///
/// # Errors
///
/// - [`ExtractorError::BinaryContent`] for binary documents (when `skip_binary` is set)
/// - [`ExtractorError::ContentTooShort`] when trimmed content is under `min_content_chars`
pub fn screen(content: &str, config: &ExtractorConfig) -> Result<String, ExtractorError> {
    if config.skip_binary && is_binary_content(content) {
        return Err(ExtractorError::BinaryContent);
    }

    let trimmed = content.trim();
    let length = trimmed.chars().count();
    if length < config.min_content_chars {
        return Err(ExtractorError::ContentTooShort {
            length,
            min: config.min_content_chars,
        });
    }

    Ok(match config.max_content_words {
        Some(max_words) => truncate_words(trimmed, max_words),
        None => trimmed.to_string(),
    })
}
