//! Truncation-tolerant JSON parsing of model output.
//!
//! Models append commentary after the JSON object, and output-length limits cut objects
//! mid-value. Repair is deliberately conservative: everything after the last `}` is dropped,
//! then characters are removed from the tail one at a time until the remainder parses. The
//! result is always a prefix of what the model wrote; no structure is ever synthesized.

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::EvalError;

/// Parses `text` as one JSON value, repairing a truncated or suffixed tail.
///
/// Any JSON value is accepted here; rejecting non-objects is the normalizer's job.
/// Fails with [`EvalError::ParseFailure`] (carrying `text`) when no prefix parses, and
/// immediately when `text` is empty or whitespace only.
pub fn parse_truncated(text: &str) -> Result<Value, EvalError> {
    let (value, attempts) = parse_with_attempts(text);
    match value {
        Some(v) => {
            debug!(attempts, "parsed evaluation json");
            Ok(v)
        }
        None => {
            debug!(attempts, "no parsable json prefix");
            Err(EvalError::ParseFailure {
                raw: text.to_string(),
            })
        }
    }
}

/// Cuts `text` right after its last `}`. Text without a `}` is returned whole.
fn cut_after_last_brace(text: &str) -> &str {
    match text.rfind('}') {
        Some(i) => &text[..=i],
        None => text,
    }
}

/// Runs the repair loop; returns the parsed value (if any) and the number of parse attempts.
///
/// At most one attempt per remaining character plus the initial one.
fn parse_with_attempts(text: &str) -> (Option<Value>, usize) {
    if text.trim().is_empty() {
        return (None, 0);
    }
    let mut candidate = cut_after_last_brace(text).to_string();
    let mut attempts = 0;
    while !candidate.is_empty() {
        attempts += 1;
        match serde_json::from_str::<Value>(&candidate) {
            Ok(v) => return (Some(v), attempts),
            Err(e) => {
                trace!(attempts, error = %e, len = candidate.len(), "parse attempt failed");
                candidate.pop();
            }
        }
    }
    (None, attempts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::test_runner::Config as ProptestConfig;
    use serde_json::json;

    /// Truncated or suffixed JSON-like text.
    fn json_like_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just("{".to_string()),
                Just("}".to_string()),
                Just("\"".to_string()),
                Just(": ".to_string()),
                Just(", ".to_string()),
                Just("[".to_string()),
                Just("]".to_string()),
                Just("\"Score\": 4".to_string()),
                "[a-zа-я0-9 ]{0,6}",
            ],
            0..16,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            failure_persistence: None,
            .. ProptestConfig::default()
        })]
        #[test]
        fn prop_attempts_bounded_by_chars_plus_one(
            text in prop_oneof![json_like_text(), any::<String>()]
        ) {
            let (_, attempts) = parse_with_attempts(&text);
            prop_assert!(attempts <= text.chars().count() + 1);
        }

        #[test]
        fn prop_success_is_a_prefix_parse(text in json_like_text()) {
            if let (Some(v), _) = parse_with_attempts(&text) {
                let parsed_from_some_prefix = text
                    .char_indices()
                    .map(|(i, c)| &text[..i + c.len_utf8()])
                    .any(|prefix| serde_json::from_str::<Value>(prefix).ok() == Some(v.clone()));
                prop_assert!(parsed_from_some_prefix);
            }
        }
    }

    #[test]
    fn parses_clean_object_in_one_attempt() {
        let (v, attempts) = parse_with_attempts(r#"{"a": 1}"#);
        assert_eq!(v, Some(json!({"a": 1})));
        assert_eq!(attempts, 1);
    }

    #[test]
    fn trailing_commentary_is_discarded() {
        let v = parse_truncated("{\"a\": {\"b\": 2}}\n\nLet me know if you need more!").unwrap();
        assert_eq!(v, json!({"a": {"b": 2}}));
    }

    #[test]
    fn empty_and_whitespace_fail_without_attempts() {
        for input in ["", "   ", "\n\t"] {
            let (v, attempts) = parse_with_attempts(input);
            assert!(v.is_none());
            assert_eq!(attempts, 0);
            assert!(matches!(
                parse_truncated(input),
                Err(EvalError::ParseFailure { .. })
            ));
        }
    }

    #[test]
    fn truncated_mid_value_fails_instead_of_inventing_data() {
        let input = r#"{"1. Clarity": {"Score": 4, "Stre"#;
        let err = parse_truncated(input).unwrap_err();
        match err {
            EvalError::ParseFailure { raw } => assert_eq!(raw, input),
            other => panic!("expected ParseFailure, got {:?}", other),
        }
    }

    #[test]
    fn truncated_after_complete_criterion_drops_partial_tail() {
        // The last `}` closes the first criterion; the cut leaves `{"A": {...}` which is
        // unbalanced, so trimming continues and finds no valid object.
        let input = r#"{"A": {"Score": 4}, "B": {"Score": 3, "Str"#;
        assert!(parse_truncated(input).is_err());
    }

    #[test]
    fn trailing_garbage_after_brace_inside_text() {
        let input = "{\"a\": \"x\"} trailing } more";
        // The last `}` belongs to the garbage; trimming walks back to the real object end.
        let v = parse_truncated(input).unwrap();
        assert_eq!(v, json!({"a": "x"}));
    }

    #[test]
    fn non_object_json_is_returned_for_schema_check() {
        assert_eq!(parse_truncated("[1, 2]").unwrap(), json!([1, 2]));
        assert_eq!(parse_truncated("42").unwrap(), json!(42));
    }

    #[test]
    fn attempts_bounded_by_length_plus_one() {
        let inputs = [
            "{",
            "{\"a\": ",
            "not json at all",
            "{\"1. Clarity\": {\"Score\": 4, \"Stre",
            "{\"a\": 1} }}}",
            "ÿ{\"ключ\": \"значение\"",
        ];
        for input in inputs {
            let (_, attempts) = parse_with_attempts(input);
            assert!(
                attempts <= input.chars().count() + 1,
                "input {:?} took {} attempts",
                input,
                attempts
            );
        }
    }

    #[test]
    fn multibyte_tail_is_trimmed_on_char_boundaries() {
        let v = parse_truncated("{\"ключ\": \"значение\"}ёж").unwrap();
        assert_eq!(v, json!({"ключ": "значение"}));
        assert!(parse_truncated("{\"ключ\": \"знач").is_err());
    }
}
