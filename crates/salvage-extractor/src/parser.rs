//! Parsing LLM responses into triples

use crate::types::Triple;
use salvage_recovery::{ArrayRecoverer, RecoveryError, RecoveryObserver, Strategy};
use tracing::debug;

/// Triples recovered from one model response
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// Records that carried a usable subject, predicate and object
    pub triples: Vec<Triple>,

    /// Strategy that recovered the array
    pub strategy: Strategy,

    /// Records recovered before filtering
    pub records: usize,
}

impl ParsedResponse {
    /// Records dropped by the subject/predicate/object filter
    pub fn rejected(&self) -> usize {
        self.records - self.triples.len()
    }
}

/// Recover the JSON array in `response` and keep the records that are triples
///
/// An empty array is a successful parse with no triples.
pub fn parse_llm_response<O: RecoveryObserver>(
    response: &str,
    recoverer: &ArrayRecoverer<O>,
) -> Result<ParsedResponse, RecoveryError> {
    let recovery = recoverer.recover(response)?;
    let records = recovery.records.len();

    let triples: Vec<Triple> = recovery
        .records
        .into_iter()
        .filter_map(Triple::from_record)
        .collect();

    if triples.len() < records {
        debug!(
            records,
            accepted = triples.len(),
            "Dropped records without subject/predicate/object"
        );
    }

    Ok(ParsedResponse {
        triples,
        strategy: recovery.strategy,
        records,
    })
}
