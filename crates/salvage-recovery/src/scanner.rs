//! String-literal-aware delimiter scanning
//!
//! Both the array matcher and the object collector walk the text one byte at a
//! time, counting nesting depth only for delimiters that sit outside JSON
//! string literals. A backslash inside a string protects the next byte, so
//! `"a \" [b]"` never moves the depth count.
//!
//! All delimiters are ASCII, so byte offsets produced here always fall on
//! UTF-8 character boundaries and can be used to slice the input directly.

use std::ops::Range;

/// An opening/closing delimiter pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    /// Opening delimiter byte
    pub open: u8,
    /// Closing delimiter byte
    pub close: u8,
}

impl Delimiters {
    /// `[` and `]`
    pub const BRACKETS: Self = Self { open: b'[', close: b']' };

    /// `{` and `}`
    pub const BRACES: Self = Self { open: b'{', close: b'}' };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralState {
    Outside,
    InString,
    Escaped,
}

/// Tracks whether the scan position is inside a string literal
#[derive(Debug)]
struct LiteralTracker {
    state: LiteralState,
}

impl LiteralTracker {
    fn new() -> Self {
        Self {
            state: LiteralState::Outside,
        }
    }

    /// Advance over one byte; returns `true` if the byte is structural.
    fn advance(&mut self, byte: u8) -> bool {
        match self.state {
            LiteralState::Escaped => {
                self.state = LiteralState::InString;
                false
            }
            LiteralState::InString => {
                match byte {
                    b'\\' => self.state = LiteralState::Escaped,
                    b'"' => self.state = LiteralState::Outside,
                    _ => {}
                }
                false
            }
            LiteralState::Outside => {
                if byte == b'"' {
                    self.state = LiteralState::InString;
                    false
                } else {
                    true
                }
            }
        }
    }
}

/// Find the delimiter that closes the one at `open_at`.
///
/// Returns the byte offset of the matching closing delimiter, or `None` when
/// `open_at` does not hold an opening delimiter or the text ends first.
pub fn find_matching(text: &str, open_at: usize, delimiters: Delimiters) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open_at) != Some(&delimiters.open) {
        return None;
    }

    let mut tracker = LiteralTracker::new();
    let mut depth = 0usize;

    for (offset, &byte) in bytes[open_at..].iter().enumerate() {
        if !tracker.advance(byte) {
            continue;
        }
        if byte == delimiters.open {
            depth += 1;
        } else if byte == delimiters.close {
            depth -= 1;
            if depth == 0 {
                return Some(open_at + offset);
            }
        }
    }

    None
}

/// Collect every complete top-level delimited span starting at or after `from`.
///
/// Spans are returned in order as half-open byte ranges that include both
/// delimiters. A trailing span left open when the text ends is dropped, and
/// stray closing delimiters at depth zero are ignored.
pub fn complete_spans(text: &str, from: usize, delimiters: Delimiters) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    if from >= bytes.len() {
        return spans;
    }

    let mut tracker = LiteralTracker::new();
    let mut depth = 0usize;
    let mut span_start = 0usize;

    for (offset, &byte) in bytes[from..].iter().enumerate() {
        if !tracker.advance(byte) {
            continue;
        }
        let index = from + offset;
        if byte == delimiters.open {
            if depth == 0 {
                span_start = index;
            }
            depth += 1;
        } else if byte == delimiters.close && depth > 0 {
            depth -= 1;
            if depth == 0 {
                spans.push(span_start..index + 1);
            }
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matching_simple() {
        let text = r#"prefix [1, [2, 3], 4] suffix"#;
        let end = find_matching(text, 7, Delimiters::BRACKETS).unwrap();
        assert_eq!(&text[7..=end], "[1, [2, 3], 4]");
    }

    #[test]
    fn test_find_matching_ignores_brackets_in_strings() {
        let text = r#"[{"a":"x [y] z"}, {"b":"]"}]"#;
        let end = find_matching(text, 0, Delimiters::BRACKETS).unwrap();
        assert_eq!(end, text.len() - 1);
    }

    #[test]
    fn test_find_matching_respects_escaped_quotes() {
        let text = r#"[{"a":"say \"]\" now"}]"#;
        let end = find_matching(text, 0, Delimiters::BRACKETS).unwrap();
        assert_eq!(end, text.len() - 1);
    }

    #[test]
    fn test_find_matching_unterminated() {
        let text = r#"[{"a":"1"},{"a":"2""#;
        assert!(find_matching(text, 0, Delimiters::BRACKETS).is_none());
    }

    #[test]
    fn test_find_matching_wrong_start() {
        assert!(find_matching("abc", 0, Delimiters::BRACKETS).is_none());
        assert!(find_matching("[]", 5, Delimiters::BRACKETS).is_none());
    }

    #[test]
    fn test_complete_spans_collects_objects() {
        let text = r#"[{"a":"1"},{"a":{"b":"2"}},{"a":"3""#;
        let spans = complete_spans(text, 1, Delimiters::BRACES);
        let found: Vec<&str> = spans.iter().map(|s| &text[s.clone()]).collect();
        assert_eq!(found, vec![r#"{"a":"1"}"#, r#"{"a":{"b":"2"}}"#]);
    }

    #[test]
    fn test_complete_spans_ignores_stray_close() {
        let text = r#"} {"a":"1"}"#;
        let spans = complete_spans(text, 0, Delimiters::BRACES);
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].clone()], r#"{"a":"1"}"#);
    }

    #[test]
    fn test_complete_spans_braces_in_strings() {
        let text = r#"{"a":"}{"} {"b":"{"}"#;
        let spans = complete_spans(text, 0, Delimiters::BRACES);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_complete_spans_multibyte_text() {
        let text = "ünïcode [{\"a\":\"café\"}] ✓";
        let spans = complete_spans(text, 0, Delimiters::BRACKETS);
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].clone()], "[{\"a\":\"café\"}]");
    }

    #[test]
    fn test_complete_spans_from_past_end() {
        assert!(complete_spans("{}", 10, Delimiters::BRACES).is_empty());
    }
}
