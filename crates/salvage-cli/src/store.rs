//! The knowledge graph output file.

use crate::error::Result;
use crate::files::{read_json, write_json};
use chrono::Utc;
use salvage_extractor::{Page, Triple};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Extracted triples grouped by page, plus a flat list of all triples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    /// Totals and provenance of the whole file
    pub metadata: GraphMetadata,

    /// One summary per processed page
    #[serde(default)]
    pub pages: BTreeMap<String, PageSummary>,

    /// Every triple, in extraction order
    #[serde(default)]
    pub all_triples: Vec<Triple>,
}

/// File-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// Creation date (`YYYY-MM-DD`)
    pub created: String,

    /// Input file the pages came from
    pub source: String,

    /// Number of entries in `pages`
    #[serde(default)]
    pub total_pages_processed: usize,

    /// Number of entries in `all_triples`
    #[serde(default)]
    pub total_triples: usize,
}

/// What the output records about one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    /// Page id
    pub id: String,
    /// Page URL
    #[serde(default)]
    pub url: String,
    /// Page title
    #[serde(default)]
    pub title: String,
    /// Source domain
    #[serde(default)]
    pub source: String,
    /// Triples extracted from it
    pub triple_count: usize,
}

impl KnowledgeGraph {
    /// An empty graph created today.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            metadata: GraphMetadata {
                created: Utc::now().format("%Y-%m-%d").to_string(),
                source: source.into(),
                total_pages_processed: 0,
                total_triples: 0,
            },
            pages: BTreeMap::new(),
            all_triples: Vec::new(),
        }
    }

    /// Load the graph at `path`, or start a new one for `source`.
    pub fn load_or_new(path: &Path, source: impl Into<String>) -> Result<Self> {
        Ok(read_json(path)?.unwrap_or_else(|| Self::new(source)))
    }

    /// Add a page's triples, replacing any earlier result for the same page.
    pub fn add_page(&mut self, page: &Page, triples: Vec<Triple>) {
        if self.pages.contains_key(&page.id) {
            self.all_triples.retain(|t| t.source_page_id != page.id);
        }

        self.pages.insert(
            page.id.clone(),
            PageSummary {
                id: page.id.clone(),
                url: page.url.clone(),
                title: page.title.clone(),
                source: page.source.clone(),
                triple_count: triples.len(),
            },
        );
        self.all_triples.extend(triples);
        self.refresh_totals();
    }

    /// Recompute totals and save.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.refresh_totals();
        write_json(path, self)
    }

    fn refresh_totals(&mut self) {
        self.metadata.total_pages_processed = self.pages.len();
        self.metadata.total_triples = self.all_triples.len();
    }
}
