//! Behavioural tests for the recovery cascade against realistic model output

use salvage_recovery::{
    ArrayRecoverer, NoopObserver, Record, Recovery, RecoveryError, RecoveryEvent, Strategy,
};
use serde_json::{json, Value};
use std::cell::RefCell;

fn recover(text: &str) -> Result<Recovery, RecoveryError> {
    ArrayRecoverer::with_observer(NoopObserver).recover(text)
}

fn as_values(records: &[Record]) -> Value {
    Value::Array(records.iter().cloned().map(Value::Object).collect())
}

#[test]
fn test_well_formed_array_parses_directly() {
    let text = r#"[{"subject":"a","predicate":"b","object":"c"}]"#;
    let recovery = recover(text).unwrap();

    assert_eq!(recovery.strategy, Strategy::DirectParse);
    assert_eq!(recovery.stage, None);
    assert_eq!(
        as_values(&recovery.records),
        json!([{"subject": "a", "predicate": "b", "object": "c"}])
    );
}

#[test]
fn test_json_code_fence_is_unwrapped() {
    let fenced = "Here is the output:\n```json\n[\n  {\"subject\": \"NHS\", \"predicate\": \"provides\", \"object\": \"care\"}\n]\n```\nLet me know!";
    let recovery = recover(fenced).unwrap();
    let inner: Value = serde_json::from_str(
        r#"[{"subject": "NHS", "predicate": "provides", "object": "care"}]"#,
    )
    .unwrap();

    assert!(recovery.fence_unwrapped);
    assert_eq!(recovery.strategy, Strategy::DirectParse);
    assert_eq!(as_values(&recovery.records), inner);
}

#[test]
fn test_untagged_code_fence_is_unwrapped() {
    let recovery = recover("```\n[{\"a\":\"1\"}]\n```").unwrap();
    assert!(recovery.fence_unwrapped);
    assert_eq!(as_values(&recovery.records), json!([{"a": "1"}]));
}

#[test]
fn test_missing_comma_between_objects() {
    let recovery = recover(r#"[{"a":"1"}{"a":"2"}]"#).unwrap();
    assert_eq!(as_values(&recovery.records), json!([{"a": "1"}, {"a": "2"}]));
}

#[test]
fn test_trailing_comma() {
    let recovery = recover(r#"[{"a":"1"},{"a":"2"},]"#).unwrap();
    assert_eq!(as_values(&recovery.records), json!([{"a": "1"}, {"a": "2"}]));
}

#[test]
fn test_truncated_array_keeps_complete_objects() {
    let recovery = recover(r#"[{"a":"1"},{"a":"2"},{"a":"3""#).unwrap();
    assert_eq!(recovery.strategy, Strategy::ObjectReconstruction);
    assert_eq!(as_values(&recovery.records), json!([{"a": "1"}, {"a": "2"}]));
}

#[test]
fn test_truncated_array_after_prose() {
    let text = "I found these facts:\n[\n  {\"subject\": \"flu\", \"predicate\": \"causes\", \"object\": \"fever\"},\n  {\"subject\": \"flu\", \"predicate\": \"spread by\", \"obj";
    let recovery = recover(text).unwrap();
    assert_eq!(recovery.records.len(), 1);
    assert_eq!(recovery.records[0]["object"], "fever");
}

#[test]
fn test_concatenated_arrays_are_merged_in_order() {
    let recovery = recover(r#"[{"a":"1"}][{"a":"2"}]"#).unwrap();
    assert_eq!(recovery.strategy, Strategy::MultiArrayMerge);
    assert_eq!(as_values(&recovery.records), json!([{"a": "1"}, {"a": "2"}]));
}

#[test]
fn test_concatenated_arrays_separated_by_newline() {
    let recovery = recover("[{\"a\":\"1\"},{\"a\":\"2\"}]\n\n[{\"a\":\"3\"},]").unwrap();
    assert_eq!(recovery.strategy, Strategy::MultiArrayMerge);
    assert_eq!(
        as_values(&recovery.records),
        json!([{"a": "1"}, {"a": "2"}, {"a": "3"}])
    );
}

#[test]
fn test_concatenated_arrays_with_truncated_second() {
    let recovery = recover(r#"[{"a":"1"}][{"a":"2"},{"a":"3""#).unwrap();
    assert_eq!(recovery.strategy, Strategy::MultiArrayMerge);
    assert_eq!(as_values(&recovery.records), json!([{"a": "1"}, {"a": "2"}]));
}

#[test]
fn test_trailing_junk_after_array_does_not_decide_recovery() {
    for text in [r#"[{"a":"1"}] [oops]"#, r#"[{"a":"1"}] [oops"#] {
        let recovery = recover(text).unwrap();
        assert_eq!(as_values(&recovery.records), json!([{"a": "1"}]), "input: {text}");
    }
}

#[test]
fn test_brackets_inside_string_values() {
    let recovery = recover(r#"[{"a":"x [y] z"}]"#).unwrap();
    assert_eq!(as_values(&recovery.records), json!([{"a": "x [y] z"}]));

    // Same value, but surrounded by prose so the scanner has to do the work.
    let recovery = recover(r#"Result: [{"a":"x [y] z"},] done"#).unwrap();
    assert_eq!(recovery.strategy, Strategy::BracketMatch);
    assert_eq!(as_values(&recovery.records), json!([{"a": "x [y] z"}]));
}

#[test]
fn test_braces_inside_truncated_string_values() {
    let recovery = recover(r#"[{"a":"set {1}"},{"a":"}{"},{"a":"#).unwrap();
    assert_eq!(
        as_values(&recovery.records),
        json!([{"a": "set {1}"}, {"a": "}{"}])
    );
}

#[test]
fn test_no_array_is_failure_not_empty() {
    assert_eq!(
        recover("Sorry, I cannot help with that."),
        Err(RecoveryError::NoJsonFound)
    );
    assert_eq!(recover(""), Err(RecoveryError::NoJsonFound));
}

#[test]
fn test_empty_array_is_success() {
    let recovery = recover("[]").unwrap();
    assert!(recovery.records.is_empty());
    assert_eq!(recovery.strategy, Strategy::DirectParse);

    let recovery = recover("No facts found: []").unwrap();
    assert!(recovery.records.is_empty());
    assert_eq!(recovery.strategy, Strategy::BracketMatch);
}

#[test]
fn test_unrecoverable_structure() {
    assert_eq!(
        recover("[this is not json at all]"),
        Err(RecoveryError::UnrecoverableMalformed)
    );
    assert_eq!(recover("[[[["), Err(RecoveryError::UnrecoverableMalformed));
}

#[test]
fn test_control_characters_in_values() {
    let recovery = recover("[{\"subject\":\"a\u{0002}b\",\"predicate\":\"p\",\"object\":\"o\"}]").unwrap();
    assert_eq!(recovery.records[0]["subject"], "ab");
}

#[test]
fn test_unquoted_keys() {
    let recovery = recover("[{subject: \"a\", predicate: \"b\", object: \"c\"}]").unwrap();
    assert_eq!(
        as_values(&recovery.records),
        json!([{"subject": "a", "predicate": "b", "object": "c"}])
    );
}

#[test]
fn test_extra_keys_are_preserved() {
    let recovery =
        recover(r#"[{"subject":"a","predicate":"b","object":"c","confidence":0.9}]"#).unwrap();
    assert_eq!(recovery.records[0]["confidence"], json!(0.9));
}

#[test]
fn test_records_missing_keys_are_left_for_the_caller() {
    let recovery = recover(r#"[{"subject":"a"},{"subject":"b","predicate":"c","object":"d"}]"#)
        .unwrap();
    assert_eq!(recovery.records.len(), 2);
}

#[test]
fn test_recovery_is_idempotent() {
    let inputs = [
        r#"[{"a":"1"}{"a":"2"}]"#,
        r#"[{"a":"1"},{"a":"2"},]"#,
        r#"[{"a":"1"},{"a":"2"},{"a":"3""#,
        r#"[{"a":"1"}][{"a":"2"}]"#,
        "```json\n[{\"a\":\"x [y] z\"}]\n```",
    ];

    for input in inputs {
        let first = recover(input).unwrap();
        let serialized = serde_json::to_string(&first.records).unwrap();
        let second = recover(&serialized).unwrap();
        assert_eq!(first.records, second.records, "input: {input}");
        assert_eq!(second.strategy, Strategy::DirectParse);
    }
}

#[test]
fn test_observer_sees_the_cascade() {
    let events = RefCell::new(Vec::new());
    let recoverer =
        ArrayRecoverer::with_observer(|event: &RecoveryEvent| events.borrow_mut().push(event.clone()));

    recoverer.recover(r#"[{"a":"1"},{"a":"2"},{"a":"3""#).unwrap();

    let events = events.into_inner();
    assert_eq!(
        events,
        vec![
            RecoveryEvent::IncompleteArray,
            RecoveryEvent::ObjectsCollected { objects: 2 },
            RecoveryEvent::Recovered {
                strategy: Strategy::ObjectReconstruction,
                stage: Some(salvage_recovery::RepairStage::ControlCharacters),
                records: 2,
            },
        ]
    );
}

#[test]
fn test_observer_sees_exhaustion() {
    let events = RefCell::new(Vec::new());
    let recoverer =
        ArrayRecoverer::with_observer(|event: &RecoveryEvent| events.borrow_mut().push(event.clone()));

    let result = recoverer.recover("[nothing here]");

    assert_eq!(result, Err(RecoveryError::UnrecoverableMalformed));
    assert_eq!(events.borrow().last(), Some(&RecoveryEvent::Exhausted));
    assert!(events.borrow().contains(&RecoveryEvent::RepairFailed));
}

#[test]
fn test_independent_texts_recover_in_parallel() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let text = format!(r#"[{{"n":"{i}"}}{{"n":"{i}"}}]"#);
                ArrayRecoverer::new().recover(&text).map(|r| r.records.len())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(2));
    }
}
