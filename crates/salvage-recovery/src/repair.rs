//! Structural repair of almost-valid JSON
//!
//! The repairer applies a fixed, ordered series of textual substitutions to a
//! candidate array or object body. Stages are cumulative: each one works on
//! the output of the previous stage, and a full parse is attempted after every
//! stage that changed the text. The first successful parse wins.
//!
//! Stages are ordered from least to most invasive. Unquoted-key normalization
//! runs last because it can rewrite bareword-looking text inside string values.
//!
//! The property-comma stage is a heuristic: adjacent quoted substrings inside
//! a single string value can be misread as a value followed by a key.

use lazy_regex::regex;
use serde_json::Value;
use std::fmt;

/// One textual repair pass
///
/// Variants are ordered as they are applied, so later stages compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RepairStage {
    /// Strip control bytes other than `\n`, `\t` and `\r`
    ControlCharacters,
    /// Insert the comma in `}{` element boundaries
    ObjectCommas,
    /// Insert the comma between a value and the following `"key":`
    PropertyCommas,
    /// Drop a comma directly before `]` or `}`
    TrailingCommas,
    /// Quote bareword keys after `{` or `,`, then re-strip trailing commas
    UnquotedKeys,
}

impl RepairStage {
    /// All stages in the order they are applied
    pub const SEQUENCE: [RepairStage; 5] = [
        RepairStage::ControlCharacters,
        RepairStage::ObjectCommas,
        RepairStage::PropertyCommas,
        RepairStage::TrailingCommas,
        RepairStage::UnquotedKeys,
    ];

    /// Short, stable name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            RepairStage::ControlCharacters => "control_characters",
            RepairStage::ObjectCommas => "object_commas",
            RepairStage::PropertyCommas => "property_commas",
            RepairStage::TrailingCommas => "trailing_commas",
            RepairStage::UnquotedKeys => "unquoted_keys",
        }
    }

    /// Apply this stage's substitutions to `text`
    pub fn apply(self, text: &str) -> String {
        match self {
            RepairStage::ControlCharacters => regex!(r"[\x00-\x08\x0b\x0c\x0e-\x1f]")
                .replace_all(text, "")
                .into_owned(),
            RepairStage::ObjectCommas => regex!(r"\}\s*\{").replace_all(text, "},{").into_owned(),
            RepairStage::PropertyCommas => {
                // "value""key": or "value" "key":
                let adjacent = regex!(r#""\s*"(\w+)"\s*:"#).replace_all(text, r#"","${1}":"#);
                // "some value"   "next_key":
                regex!(r#"("(?:[^"\\]|\\.)*")\s+("(?:[^"\\]|\\.)*"\s*:)"#)
                    .replace_all(&adjacent, "${1},${2}")
                    .into_owned()
            }
            RepairStage::TrailingCommas => strip_trailing_commas(text),
            RepairStage::UnquotedKeys => {
                let quoted = regex!(r"([\{,])\s*(\w+)\s*:").replace_all(text, r#"${1} "${2}":"#);
                strip_trailing_commas(&quoted)
            }
        }
    }
}

impl fmt::Display for RepairStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn strip_trailing_commas(text: &str) -> String {
    regex!(r",(\s*[\]}])").replace_all(text, "${1}").into_owned()
}

/// A successful repair
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    /// The parsed value
    pub value: Value,
    /// The stage whose output parsed
    pub stage: RepairStage,
}

/// Coerce an almost-valid JSON array or object body into a parsed value.
///
/// Returns `None` once every stage has been tried without a successful parse.
/// Parse errors never escape this function.
pub fn repair(candidate: &str) -> Option<Repaired> {
    let mut current = candidate.to_string();

    for (index, stage) in RepairStage::SEQUENCE.into_iter().enumerate() {
        let next = stage.apply(&current);
        // Unchanged text cannot parse any better than it did last time.
        if index > 0 && next == current {
            continue;
        }
        current = next;

        if let Ok(value) = serde_json::from_str::<Value>(&current) {
            return Some(Repaired { value, stage });
        }
    }

    None
}

/// Like [`repair`], discarding which stage succeeded
pub fn repair_json(candidate: &str) -> Option<Value> {
    repair(candidate).map(|repaired| repaired.value)
}
