//! Text chunking strategies for long pages

use crate::config::ChunkStrategy;

/// Chunks text according to the specified strategy
///
/// Sizes are measured in characters, and splits always land on character
/// boundaries.
pub struct TextChunker {
    strategy: ChunkStrategy,
    max_chunk_size: usize,
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(strategy: ChunkStrategy, max_chunk_size: usize) -> Self {
        Self {
            strategy,
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// Chunk the given text
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if char_len(text) <= self.max_chunk_size {
            return vec![text.to_string()];
        }

        match self.strategy {
            ChunkStrategy::ByParagraph => self.chunk_by_paragraph(text),
            ChunkStrategy::BySection => self.chunk_by_section(text),
            ChunkStrategy::BySentence => self.chunk_by_sentence(text),
        }
    }

    fn chunk_by_paragraph(&self, text: &str) -> Vec<String> {
        let paragraphs: Vec<&str> = text
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .collect();
        self.combine_until_limit(paragraphs, "\n\n")
    }

    fn chunk_by_section(&self, text: &str) -> Vec<String> {
        let mut sections = Vec::new();
        let mut current_section = String::new();

        for line in text.lines() {
            if is_section_header(line) && !current_section.trim().is_empty() {
                sections.push(current_section.trim().to_string());
                current_section.clear();
            }

            current_section.push_str(line);
            current_section.push('\n');
        }

        if !current_section.trim().is_empty() {
            sections.push(current_section.trim().to_string());
        }

        if sections.len() <= 1 {
            return self.chunk_by_paragraph(text);
        }
        self.combine_until_limit(sections, "\n\n")
    }

    fn chunk_by_sentence(&self, text: &str) -> Vec<String> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return vec![text.to_string()];
        }
        self.combine_until_limit(sentences, " ")
    }

    /// Combine elements until they reach the size limit
    fn combine_until_limit<S: AsRef<str>>(&self, elements: Vec<S>, joiner: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current_chunk = String::new();
        let mut current_len = 0;
        let joiner_len = char_len(joiner);

        for element in elements {
            let element = element.as_ref().trim();
            let element_len = char_len(element);
            let separator = if current_chunk.is_empty() { 0 } else { joiner_len };

            if current_len + separator + element_len <= self.max_chunk_size {
                if separator > 0 {
                    current_chunk.push_str(joiner);
                }
                current_chunk.push_str(element);
                current_len += separator + element_len;
                continue;
            }

            if !current_chunk.is_empty() {
                chunks.push(std::mem::take(&mut current_chunk));
                current_len = 0;
            }

            if element_len > self.max_chunk_size {
                chunks.extend(split_at_char_limit(element, self.max_chunk_size));
            } else {
                current_chunk.push_str(element);
                current_len = element_len;
            }
        }

        if !current_chunk.is_empty() {
            chunks.push(current_chunk);
        }

        chunks
    }
}

/// Markdown headers (`# Header`) or numbered sections (`1. Section`)
fn is_section_header(line: &str) -> bool {
    let line = line.trim_start();
    if line.starts_with('#') {
        return true;
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && line[digits..].starts_with(". ")
}

/// Sentences with their terminating punctuation kept
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for (index, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let end = index + c.len_utf8();
            let followed_by_space = text[end..]
                .chars()
                .next()
                .map_or(true, char::is_whitespace);
            if followed_by_space {
                sentences.push(&text[start..end]);
                start = end;
            }
        }
    }
    sentences.push(&text[start..]);

    sentences.retain(|s| !s.trim().is_empty());
    sentences
}

/// Split text every `limit` characters
fn split_at_char_limit(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit)
        .map(|piece| piece.iter().collect())
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
