//! Input pages, extracted triples and per-page results

use salvage_recovery::{Record, Strategy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A scraped page to extract facts from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    /// Stable page identifier
    pub id: String,

    /// Page URL
    pub url: String,

    /// Page title
    pub title: String,

    /// Source domain or collection name
    pub source: String,

    /// Scraped text
    pub content: String,

    /// Identifier of the page this one duplicates, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_duplicate_of: Option<String>,
}

impl Page {
    /// Whether the page duplicates another and should not be extracted
    pub fn is_duplicate(&self) -> bool {
        self.is_duplicate_of
            .as_deref()
            .is_some_and(|original| !original.is_empty())
    }
}

/// A collection of pages as stored on disk: `{"pages": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSet {
    /// All pages, duplicates included
    pub pages: Vec<Page>,
}

/// A subject-predicate-object fact with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    /// Subject entity
    pub subject: String,

    /// Predicate/relationship
    pub predicate: String,

    /// Object entity or value
    pub object: String,

    /// Any other keys the model emitted (chunk numbers, confidence, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Page the triple was extracted from
    #[serde(default)]
    pub source_page_id: String,

    /// URL of that page
    #[serde(default)]
    pub source_url: String,

    /// Source domain of that page
    #[serde(default)]
    pub source_domain: String,
}

const PROVENANCE_KEYS: [&str; 3] = ["source_page_id", "source_url", "source_domain"];

impl Triple {
    /// Build a triple from a recovered record
    ///
    /// Returns `None` unless `subject`, `predicate` and `object` are all present
    /// and scalar. Numbers and booleans are kept as their JSON text. Provenance
    /// keys the model invented are discarded; use [`Triple::with_provenance`].
    pub fn from_record(mut record: Record) -> Option<Self> {
        let subject = take_scalar(&mut record, "subject")?;
        let predicate = take_scalar(&mut record, "predicate")?;
        let object = take_scalar(&mut record, "object")?;

        for key in PROVENANCE_KEYS {
            record.remove(key);
        }

        Some(Self {
            subject,
            predicate,
            object,
            extra: record,
            source_page_id: String::new(),
            source_url: String::new(),
            source_domain: String::new(),
        })
    }

    /// Stamp the triple with the page it came from
    pub fn with_provenance(mut self, page: &Page) -> Self {
        self.source_page_id = page.id.clone();
        self.source_url = page.url.clone();
        self.source_domain = page.source.clone();
        self
    }
}

fn take_scalar(record: &mut Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => {
            let s = s.trim().to_string();
            record.remove(key);
            Some(s)
        }
        Value::Number(n) => {
            let s = n.to_string();
            record.remove(key);
            Some(s)
        }
        Value::Bool(b) => {
            let s = b.to_string();
            record.remove(key);
            Some(s)
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Outcome of one chunk's model call
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// The response was recovered
    Recovered {
        /// Strategy that produced the records
        strategy: Strategy,
        /// Records recovered from the response
        records: usize,
        /// Records accepted as triples
        accepted: usize,
    },
    /// No array could be recovered from the response
    Failed {
        /// Why recovery failed
        reason: String,
    },
}

/// Per-chunk report
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkReport {
    /// Zero-based chunk index
    pub index: usize,

    /// Chunk length in characters
    pub chars: usize,

    /// What happened to it
    pub outcome: ChunkOutcome,
}

/// Result of extracting one page
#[derive(Debug, Clone)]
pub struct PageExtraction {
    /// Accepted triples, in response order, stamped with provenance
    pub triples: Vec<Triple>,

    /// One report per chunk sent to the model
    pub chunks: Vec<ChunkReport>,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

impl PageExtraction {
    /// Chunks whose response could not be recovered
    pub fn failed_chunks(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| matches!(c.outcome, ChunkOutcome::Failed { .. }))
            .count()
    }
}

/// Metadata about the extraction process
#[derive(Debug, Clone)]
pub struct ExtractionMetadata {
    /// Model that answered
    pub model: String,

    /// Wall-clock time (milliseconds)
    pub processing_time_ms: u64,

    /// Characters of page text sent to the model
    pub content_chars: usize,

    /// Records dropped for missing or malformed subject/predicate/object
    pub records_rejected: usize,
}
