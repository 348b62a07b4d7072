//! Array recovery cascade
//!
//! Locates JSON-array content in a free-text model response and runs an
//! ordered list of [`Strategy`] values against it, cheapest and most precise
//! first. The first strategy that yields a parsed array wins.

use crate::error::RecoveryError;
use crate::observer::{RecoveryEvent, RecoveryObserver, TracingObserver};
use crate::repair::{repair, RepairStage, Repaired};
use crate::scanner::{complete_spans, find_matching, Delimiters};
use lazy_regex::regex;
use serde_json::{Map, Value};
use std::fmt;

/// One recovered fact: a JSON object with arbitrary keys
pub type Record = Map<String, Value>;

/// A recovery strategy, in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Parse the (fence-unwrapped) text as-is
    DirectParse,
    /// Repair the first string-aware bracket-matched array
    BracketMatch,
    /// Collect every complete `{...}` after the first `[` and re-wrap them
    ObjectReconstruction,
    /// Repair each top-level array separately and concatenate the results
    MultiArrayMerge,
}

impl Strategy {
    /// Strategies in the order they are attempted
    pub const CASCADE: [Strategy; 4] = [
        Strategy::DirectParse,
        Strategy::BracketMatch,
        Strategy::ObjectReconstruction,
        Strategy::MultiArrayMerge,
    ];

    /// Short, stable name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            Strategy::DirectParse => "direct_parse",
            Strategy::BracketMatch => "bracket_match",
            Strategy::ObjectReconstruction => "object_reconstruction",
            Strategy::MultiArrayMerge => "multi_array_merge",
        }
    }

    /// Whether this strategy runs for the located text.
    ///
    /// Concatenated arrays go straight to [`Strategy::MultiArrayMerge`].
    pub fn applies(self, located: &Located<'_>) -> bool {
        match self {
            Strategy::DirectParse => true,
            Strategy::BracketMatch => located.array_end.is_some() && !located.concatenated,
            Strategy::ObjectReconstruction => {
                located.array_start.is_some() && !located.concatenated
            }
            Strategy::MultiArrayMerge => located.array_start.is_some(),
        }
    }

    /// Run this strategy alone against the located text
    pub fn attempt<O: RecoveryObserver>(
        self,
        located: &Located<'_>,
        observer: &O,
    ) -> Option<Attempt> {
        match self {
            Strategy::DirectParse => {
                let value = serde_json::from_str::<Value>(located.text).ok()?;
                into_records(value, observer).map(|records| Attempt {
                    records,
                    stage: None,
                })
            }
            Strategy::BracketMatch => {
                let start = located.array_start?;
                let end = located.array_end?;
                let attempt = repair(&located.text[start..=end])
                    .and_then(|repaired| Attempt::from_repaired(repaired, observer));
                if attempt.is_none() {
                    observer.observe(&RecoveryEvent::RepairFailed);
                }
                attempt
            }
            Strategy::ObjectReconstruction => {
                let start = located.array_start?;
                reconstruct_objects(located.text, start + 1, observer)
            }
            Strategy::MultiArrayMerge => {
                let start = located.array_start?;
                let arrays = complete_spans(located.text, start, Delimiters::BRACKETS);
                // A lone array was already tried unless concatenation skipped it
                if arrays.len() < 2 && !located.concatenated {
                    return None;
                }
                let tail_from = arrays.last().map_or(start, |span| span.end);

                let mut attempts: Vec<Attempt> = arrays
                    .into_iter()
                    .filter_map(|span| {
                        repair(&located.text[span])
                            .and_then(|repaired| Attempt::from_repaired(repaired, observer))
                    })
                    .collect();

                // A cut-off trailing array still holds its complete objects
                if located.concatenated {
                    if let Some(offset) = located.text[tail_from..].find('[') {
                        attempts.extend(reconstruct_objects(
                            located.text,
                            tail_from + offset + 1,
                            observer,
                        ));
                    }
                }

                let stage = attempts.iter().map(|attempt| attempt.stage).max().flatten();
                let records: Vec<Record> =
                    attempts.into_iter().flat_map(|attempt| attempt.records).collect();
                if records.is_empty() {
                    return None;
                }
                Some(Attempt { records, stage })
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Records produced by a single strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// Records recovered
    pub records: Vec<Record>,
    /// Repair stage that made the text parse, if repair was involved
    pub stage: Option<RepairStage>,
}

impl Attempt {
    fn from_repaired<O: RecoveryObserver>(repaired: Repaired, observer: &O) -> Option<Self> {
        into_records(repaired.value, observer).map(|records| Self {
            records,
            stage: Some(repaired.stage),
        })
    }
}

/// Where the first array sits in the working text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<'t> {
    /// The working text (fence-unwrapped when a fence was present)
    pub text: &'t str,
    /// Byte offset of the first `[`
    pub array_start: Option<usize>,
    /// Byte offset of the `]` matching `array_start`
    pub array_end: Option<usize>,
    /// Another `[` follows the matched array, ignoring whitespace
    pub concatenated: bool,
}

impl<'t> Located<'t> {
    /// Scan `text` for the first array
    pub fn scan(text: &'t str) -> Self {
        let array_start = text.find('[');
        let array_end =
            array_start.and_then(|start| find_matching(text, start, Delimiters::BRACKETS));
        let concatenated = array_end
            .map(|end| text[end + 1..].trim_start().starts_with('['))
            .unwrap_or(false);

        Self {
            text,
            array_start,
            array_end,
            concatenated,
        }
    }
}

/// A successful recovery
#[derive(Debug, Clone, PartialEq)]
pub struct Recovery {
    /// Records recovered, possibly empty when `[]` was parsed
    pub records: Vec<Record>,
    /// The strategy that produced them
    pub strategy: Strategy,
    /// Repair stage that made the text parse, if repair was involved
    pub stage: Option<RepairStage>,
    /// Whether the text was narrowed to a fenced code block first
    pub fence_unwrapped: bool,
}

/// Recovers arrays of records from model responses
#[derive(Debug, Clone, Default)]
pub struct ArrayRecoverer<O = TracingObserver> {
    observer: O,
}

impl ArrayRecoverer<TracingObserver> {
    /// Create a recoverer that reports through `tracing`
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O: RecoveryObserver> ArrayRecoverer<O> {
    /// Create a recoverer that reports to `observer`
    pub fn with_observer(observer: O) -> Self {
        Self { observer }
    }

    /// Recover a sequence of records from arbitrary text.
    ///
    /// # Errors
    ///
    /// - [`RecoveryError::NoJsonFound`] when the text has no `[` and does not
    ///   parse directly as an array
    /// - [`RecoveryError::UnrecoverableMalformed`] when every strategy fails
    pub fn recover(&self, text: &str) -> Result<Recovery, RecoveryError> {
        let (working, fence_unwrapped) = match unwrap_code_fence(text) {
            Some(inner) => {
                self.observer.observe(&RecoveryEvent::FenceUnwrapped);
                (inner, true)
            }
            None => (text, false),
        };

        let located = Located::scan(working);

        for strategy in Strategy::CASCADE {
            if strategy != Strategy::DirectParse {
                if located.array_start.is_none() {
                    self.observer.observe(&RecoveryEvent::NoArrayStart);
                    return Err(RecoveryError::NoJsonFound);
                }
                if strategy == Strategy::BracketMatch {
                    self.note_array_shape(&located);
                }
            }

            if !strategy.applies(&located) {
                continue;
            }

            if let Some(attempt) = strategy.attempt(&located, &self.observer) {
                self.observer.observe(&RecoveryEvent::Recovered {
                    strategy,
                    stage: attempt.stage,
                    records: attempt.records.len(),
                });
                return Ok(Recovery {
                    records: attempt.records,
                    strategy,
                    stage: attempt.stage,
                    fence_unwrapped,
                });
            }
        }

        self.observer.observe(&RecoveryEvent::Exhausted);
        Err(RecoveryError::UnrecoverableMalformed)
    }

    fn note_array_shape(&self, located: &Located<'_>) {
        if located.array_end.is_none() {
            self.observer.observe(&RecoveryEvent::IncompleteArray);
        } else if located.concatenated {
            self.observer.observe(&RecoveryEvent::MultipleArraysDetected);
        }
    }
}

/// Recover records from `text`, reporting through `tracing`
pub fn recover_records(text: &str) -> Result<Vec<Record>, RecoveryError> {
    ArrayRecoverer::new()
        .recover(text)
        .map(|recovery| recovery.records)
}

/// Content of the first fenced code block (optionally tagged `json`), trimmed
pub fn unwrap_code_fence(text: &str) -> Option<&str> {
    regex!(r"(?s)```(?:json)?\s*(.*?)```")
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|content| content.as_str().trim())
}

/// Re-wrap every complete `{...}` at or after `from` as one array and repair it
fn reconstruct_objects<O: RecoveryObserver>(
    text: &str,
    from: usize,
    observer: &O,
) -> Option<Attempt> {
    let spans = complete_spans(text, from, Delimiters::BRACES);
    if spans.is_empty() {
        return None;
    }
    observer.observe(&RecoveryEvent::ObjectsCollected {
        objects: spans.len(),
    });
    let objects: Vec<&str> = spans.into_iter().map(|span| &text[span]).collect();
    let reconstructed = format!("[\n{}\n]", objects.join(",\n"));
    repair(&reconstructed).and_then(|repaired| Attempt::from_repaired(repaired, observer))
}

fn into_records<O: RecoveryObserver>(value: Value, observer: &O) -> Option<Vec<Record>> {
    let Value::Array(elements) = value else {
        return None;
    };
    let total = elements.len();
    let records: Vec<Record> = elements
        .into_iter()
        .filter_map(|element| match element {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();
    if records.len() < total {
        observer.observe(&RecoveryEvent::NonObjectsDropped {
            count: total - records.len(),
        });
    }
    Some(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use std::cell::RefCell;

    fn recover(text: &str) -> Result<Recovery, RecoveryError> {
        ArrayRecoverer::with_observer(NoopObserver).recover(text)
    }

    #[test]
    fn test_located_scan() {
        let located = Located::scan(r#"x [{"a":"]"}] [1]"#);
        assert_eq!(located.array_start, Some(2));
        assert_eq!(located.array_end, Some(12));
        assert!(located.concatenated);
    }

    #[test]
    fn test_located_scan_without_array() {
        let located = Located::scan("plain prose");
        assert_eq!(located.array_start, None);
        assert_eq!(located.array_end, None);
        assert!(!located.concatenated);
    }

    #[test]
    fn test_strategy_applicability() {
        let complete = Located::scan(r#"[{"a":"1"}]"#);
        let truncated = Located::scan(r#"[{"a":"1"},{"a""#);
        let doubled = Located::scan(r#"[{"a":"1"}] [{"a":"2"}]"#);

        assert!(Strategy::BracketMatch.applies(&complete));
        assert!(!Strategy::BracketMatch.applies(&truncated));
        assert!(Strategy::ObjectReconstruction.applies(&truncated));
        assert!(!Strategy::BracketMatch.applies(&doubled));
        assert!(!Strategy::ObjectReconstruction.applies(&doubled));
        assert!(Strategy::MultiArrayMerge.applies(&doubled));
    }

    #[test]
    fn test_each_strategy_in_isolation() {
        let located = Located::scan(r#"Facts: [{"a":"1"},{"a":"2"},{"a""#);
        assert!(Strategy::DirectParse.attempt(&located, &NoopObserver).is_none());
        assert!(Strategy::BracketMatch.attempt(&located, &NoopObserver).is_none());
        let attempt = Strategy::ObjectReconstruction
            .attempt(&located, &NoopObserver)
            .unwrap();
        assert_eq!(attempt.records.len(), 2);
    }

    #[test]
    fn test_bracket_match_reports_stage() {
        let recovery = recover(r#"Here you go: [{"a":"1"}{"a":"2"}] Hope it helps"#).unwrap();
        assert_eq!(recovery.strategy, Strategy::BracketMatch);
        assert_eq!(recovery.stage, Some(RepairStage::ObjectCommas));
        assert_eq!(recovery.records.len(), 2);
    }

    #[test]
    fn test_repair_failure_falls_through_to_reconstruction() {
        // Matched array, but the dangling key makes it unrepairable.
        let recovery = recover(r#"[{"a":"1"}, "b": ]"#).unwrap();
        assert_eq!(recovery.strategy, Strategy::ObjectReconstruction);
        assert_eq!(recovery.records.len(), 1);
    }

    #[test]
    fn test_non_object_elements_dropped() {
        let events = RefCell::new(Vec::new());
        let recoverer = ArrayRecoverer::with_observer(|event: &RecoveryEvent| {
            events.borrow_mut().push(event.clone())
        });
        let recovery = recoverer.recover(r#"[{"a":"1"}, 2, "three"]"#).unwrap();
        assert_eq!(recovery.records.len(), 1);
        assert!(events
            .borrow()
            .contains(&RecoveryEvent::NonObjectsDropped { count: 2 }));
    }

    #[test]
    fn test_top_level_object_is_not_an_array() {
        assert_eq!(
            recover(r#"{"subject":"a","predicate":"b","object":"c"}"#),
            Err(RecoveryError::NoJsonFound)
        );
    }

    #[test]
    fn test_wrapped_array_inside_object() {
        let recovery = recover(r#"{"triples": [{"subject":"a"}]}"#).unwrap();
        assert_eq!(recovery.strategy, Strategy::BracketMatch);
        assert_eq!(recovery.records[0]["subject"], "a");
    }

    #[test]
    fn test_merge_runs_on_single_complete_array_when_concatenated() {
        let located = Located::scan(r#"[{"a":"1"}] [{"a":"2"},{"a""#);
        assert!(located.concatenated);

        let attempt = Strategy::MultiArrayMerge
            .attempt(&located, &NoopObserver)
            .unwrap();
        assert_eq!(attempt.records.len(), 2);
        assert_eq!(attempt.records[1]["a"], "2");
    }

    #[test]
    fn test_merge_needs_two_arrays_without_concatenation() {
        let located = Located::scan(r#"[{"a":"1"},]"#);
        assert!(Strategy::MultiArrayMerge
            .attempt(&located, &NoopObserver)
            .is_none());
    }

    #[test]
    fn test_unwrap_code_fence() {
        assert_eq!(unwrap_code_fence("```json\n[1]\n```"), Some("[1]"));
        assert_eq!(unwrap_code_fence("text ```\n[2]```"), Some("[2]"));
        assert_eq!(unwrap_code_fence("```json\n[1]"), None);
        assert_eq!(unwrap_code_fence("no fence"), None);
    }
}
