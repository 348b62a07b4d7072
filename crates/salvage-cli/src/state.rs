//! Checkpoint state shared by `extract`, `retry` and `status`.

use crate::error::Result;
use crate::files::{read_json, write_json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the pipeline is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Pages remain to be attempted
    #[default]
    Extracting,
    /// Every page has been attempted at least once
    Complete,
}

/// Which pages have been attempted and how they went.
///
/// A page id is in at most one of the three lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionState {
    /// Current phase
    pub phase: Phase,

    /// Pages with at least one extracted triple
    pub processed_ids: Vec<String>,

    /// Pages that failed and may be retried
    pub failed_ids: Vec<String>,

    /// Pages that can never succeed
    pub skipped_ids: Vec<String>,

    /// Triples extracted so far
    pub total_triples: usize,

    /// Time of the last save
    pub last_updated: Option<DateTime<Utc>>,
}

impl ExtractionState {
    /// Load the state, or a fresh one if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(read_json(path)?.unwrap_or_default())
    }

    /// Stamp `last_updated` and save.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Some(Utc::now());
        write_json(path, self)
    }

    /// Whether the page has been processed, failed or skipped.
    pub fn is_settled(&self, id: &str) -> bool {
        self.is_processed(id) || self.is_failed(id) || self.is_skipped(id)
    }

    /// Whether the page has been processed.
    pub fn is_processed(&self, id: &str) -> bool {
        self.processed_ids.iter().any(|p| p == id)
    }

    /// Whether the page is waiting for a retry.
    pub fn is_failed(&self, id: &str) -> bool {
        self.failed_ids.iter().any(|p| p == id)
    }

    /// Whether the page has been given up on.
    pub fn is_skipped(&self, id: &str) -> bool {
        self.skipped_ids.iter().any(|p| p == id)
    }

    /// Record a page that yielded `triples` triples.
    pub fn record_success(&mut self, id: &str, triples: usize) {
        self.forget(id);
        self.processed_ids.push(id.to_string());
        self.total_triples += triples;
    }

    /// Record a page that failed and may be retried later.
    pub fn record_failure(&mut self, id: &str) {
        self.forget(id);
        self.failed_ids.push(id.to_string());
    }

    /// Record a page that will never succeed.
    pub fn record_skip(&mut self, id: &str) {
        self.forget(id);
        self.skipped_ids.push(id.to_string());
    }

    fn forget(&mut self, id: &str) {
        self.processed_ids.retain(|p| p != id);
        self.failed_ids.retain(|p| p != id);
        self.skipped_ids.retain(|p| p != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = ExtractionState::load(&dir.path().join("state.json")).unwrap();
        assert_eq!(state, ExtractionState::default());
        assert_eq!(state.phase, Phase::Extracting);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = ExtractionState::default();
        state.record_success("page-1", 4);
        state.record_failure("page-2");
        state.save(&path).unwrap();

        let reloaded = ExtractionState::load(&path).unwrap();
        assert_eq!(reloaded.processed_ids, vec!["page-1"]);
        assert_eq!(reloaded.failed_ids, vec!["page-2"]);
        assert_eq!(reloaded.total_triples, 4);
        assert!(reloaded.last_updated.is_some());
    }

    #[test]
    fn test_reads_state_without_skipped_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"phase": "extracting", "processed_ids": ["a"], "failed_ids": [], "total_triples": 3, "last_updated": null}"#,
        )
        .unwrap();

        let state = ExtractionState::load(&path).unwrap();
        assert!(state.skipped_ids.is_empty());
        assert!(state.is_settled("a"));
    }

    #[test]
    fn test_ids_live_in_one_list() {
        let mut state = ExtractionState::default();
        state.record_failure("page-1");
        state.record_failure("page-2");
        state.record_failure("page-1");
        assert_eq!(state.failed_ids, vec!["page-2", "page-1"]);

        state.record_success("page-1", 2);
        assert_eq!(state.failed_ids, vec!["page-2"]);
        assert_eq!(state.processed_ids, vec!["page-1"]);

        state.record_skip("page-2");
        assert!(state.failed_ids.is_empty());
        assert!(state.is_skipped("page-2"));
    }
}
