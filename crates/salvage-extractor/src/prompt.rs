//! LLM prompt engineering for triple extraction

use salvage_llm::ChatRequest;

/// Builds prompts for the LLM to extract subject-predicate-object triples
pub struct PromptBuilder<'a> {
    text: &'a str,
    title: Option<&'a str>,
    chunk: Option<(usize, usize)>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder for `text`
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            title: None,
            chunk: None,
        }
    }

    /// Name the page the text comes from
    pub fn with_title(mut self, title: &'a str) -> Self {
        let title = title.trim();
        self.title = (!title.is_empty()).then_some(title);
        self
    }

    /// Mark the text as chunk `index` (zero-based) of `total`
    pub fn with_chunk(mut self, index: usize, total: usize) -> Self {
        self.chunk = (total > 1).then_some((index, total));
        self
    }

    /// Build the user prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        if let Some(title) = self.title {
            prompt.push_str(&format!("Page title: {}\n", title));
        }
        if let Some((index, total)) = self.chunk {
            prompt.push_str(&format!("Part {} of {}\n", index + 1, total));
        }

        prompt.push_str("TEXT:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    /// Build the full request, system prompt included
    pub fn request(&self) -> ChatRequest {
        ChatRequest::new(self.build()).with_system(SYSTEM_PROMPT)
    }
}

/// System prompt sent with every extraction request
pub const SYSTEM_PROMPT: &str = "You are a knowledge graph builder. You read health information pages \
and extract factual relationships as JSON. You never add commentary.";

const EXTRACTION_INSTRUCTIONS: &str = r#"Extract the key facts from the following text as subject-predicate-object triples.

Rules:
- One fact per triple
- Keep subjects and objects short (1-4 words), using the same name for the same entity
- Predicates are short verb phrases ("causes", "is treated with", "is a symptom of")
- Only state what the text states; do not add outside knowledge
- Skip navigation text, cookie notices and contact details"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Return ONLY a JSON array like this, nothing else:
[{"subject": "X", "predicate": "does Y", "object": "Z"}]

JSON:"#;
