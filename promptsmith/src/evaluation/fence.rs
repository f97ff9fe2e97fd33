//! Removes code-fence markup that models wrap around a JSON payload.
//!
//! Only a leading fence (optionally language-tagged) and the matching trailing fence are
//! removed; the body between them is returned as-is apart from surrounding whitespace.

/// Fence marker used by markdown-style model output.
const FENCE: &str = "```";

/// Format names removed after an opening fence even when no whitespace follows them.
const KNOWN_FORMAT_TAGS: &[&str] = &["json", "json5", "jsonc"];

/// Strips enclosing code fences from `raw`.
///
/// Returns the trimmed input unchanged when it does not start with a fence. Nested fences
/// are peeled until none is left, so applying this twice gives the same result as once.
pub fn strip_fences(raw: &str) -> String {
    let mut text = raw.trim();
    while let Some(inner) = strip_once(text) {
        text = inner;
    }
    text.to_string()
}

/// Removes one opening fence (with its tag) and, if present, one trailing fence.
/// `None` when `text` does not start with a fence.
fn strip_once(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;
    let rest = skip_format_tag(rest);
    let rest = rest.trim_end();
    let rest = rest.strip_suffix(FENCE).unwrap_or(rest);
    Some(rest.trim())
}

/// Skips a format-name token right after an opening fence.
///
/// A token counts as a tag when it is a known format name, or when it is followed by
/// whitespace (or nothing). Anything else is payload and is kept.
fn skip_format_tag(rest: &str) -> &str {
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')))
        .unwrap_or(rest.len());
    if tag_len == 0 {
        return rest;
    }
    let (tag, after) = rest.split_at(tag_len);
    let known = KNOWN_FORMAT_TAGS
        .iter()
        .any(|t| t.eq_ignore_ascii_case(tag));
    if known || after.is_empty() || after.starts_with(char::is_whitespace) {
        after
    } else {
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::test_runner::Config as ProptestConfig;

    /// Text assembled from fence markers, tags, whitespace and JSON-ish fragments.
    fn fence_heavy_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just("```".to_string()),
                Just("```json".to_string()),
                Just("```JSON".to_string()),
                Just("json".to_string()),
                Just("`".to_string()),
                Just("\n".to_string()),
                Just(" ".to_string()),
                Just("{\"a\": 1}".to_string()),
                "[a-zA-Z0-9{}:\",\t -]{0,8}",
            ],
            0..12,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            failure_persistence: None,
            .. ProptestConfig::default()
        })]
        #[test]
        fn prop_strip_is_idempotent(x in prop_oneof![fence_heavy_text(), any::<String>()]) {
            let once = strip_fences(&x);
            prop_assert_eq!(strip_fences(&once), once);
        }

        #[test]
        fn prop_fenced_payload_is_recovered(body in "[a-zA-Z0-9{}:\", ]{0,40}") {
            let body = body.trim().to_string();
            let fenced = format!("```json\n{}\n```", body);
            prop_assert_eq!(strip_fences(&fenced), body);
        }
    }

    #[test]
    fn strips_language_tagged_fence() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_uppercase_tag_without_newline() {
        assert_eq!(strip_fences("```JSON{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_fences("```\n{\"a\": 1}\n```\n"), "{\"a\": 1}");
    }

    #[test]
    fn opening_fence_without_closing_fence() {
        // Truncated output: the closing fence never arrived.
        assert_eq!(strip_fences("```json\n{\"a\": 1"), "{\"a\": 1");
    }

    #[test]
    fn unfenced_input_is_only_trimmed() {
        assert_eq!(strip_fences("  {\"a\": \"```\"}  \n"), "{\"a\": \"```\"}");
    }

    #[test]
    fn unknown_tag_followed_by_whitespace_is_removed() {
        assert_eq!(strip_fences("```yaml\nkey: v\n```"), "key: v");
    }

    #[test]
    fn payload_glued_to_fence_is_kept() {
        assert_eq!(strip_fences("```true```"), "true");
    }

    #[test]
    fn inner_backticks_in_body_are_untouched() {
        let raw = "```json\n{\"code\": \"use ```rust``` blocks\"}\n```";
        assert_eq!(strip_fences(raw), "{\"code\": \"use ```rust``` blocks\"}");
    }

    #[test]
    fn nested_fences_are_peeled() {
        assert_eq!(strip_fences("```\n```json\n{}\n```\n```"), "{}");
    }

    #[test]
    fn empty_and_fence_only_inputs() {
        assert_eq!(strip_fences(""), "");
        assert_eq!(strip_fences("   "), "");
        assert_eq!(strip_fences("```"), "");
        assert_eq!(strip_fences("``````"), "");
    }

    #[test]
    fn stripping_is_idempotent() {
        let inputs = [
            "",
            "plain text",
            "```json\n{\"a\": 1}\n```",
            "```\n```json\n{}\n```\n```",
            "```json{\"a\":1}",
            "   ```  ```  ",
            "{\"a\": 1}\n```",
            "``` json\n{}\n```",
            "````json\n{}\n````",
        ];
        for x in inputs {
            let once = strip_fences(x);
            assert_eq!(strip_fences(&once), once, "input: {:?}", x);
        }
    }
}
