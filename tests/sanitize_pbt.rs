//! Property-based tests for the pure sanitization and normalization helpers.
//!
//! Invariants:
//! - Normalization is idempotent and case-collapsing
//! - Fence wrapping never changes the parsed result
//! - One level of double encoding is always recovered
//! - Malformed input degrades to an error, never a panic

use proptest::prelude::*;

use linguacard_backend::services::pipeline::{sanitize, PipelineError};
use linguacard_backend::services::vocabulary::normalize_word;

proptest! {
    #[test]
    fn normalize_is_idempotent(word in "\\PC{0,24}") {
        let once = normalize_word(&word);
        prop_assert_eq!(normalize_word(&once), once);
    }

    #[test]
    fn normalize_collapses_ascii_case(word in "[a-zA-Z]{1,16}") {
        prop_assert_eq!(
            normalize_word(&word),
            normalize_word(&word.to_uppercase())
        );
    }

    #[test]
    fn fence_wrapping_never_changes_the_parse(
        source in "[a-z ]{1,32}",
        target in "[a-z ]{1,32}",
    ) {
        let body = serde_json::json!({
            "primary": { "source_text": source, "target_text": target }
        })
        .to_string();
        let fenced = format!("```json\n{body}\n```");

        let bare = sanitize(&body).unwrap();
        let wrapped = sanitize(&fenced).unwrap();
        prop_assert_eq!(bare, wrapped);
    }

    #[test]
    fn double_encoding_recovers_inner_object(source in "[a-z]{1,16}") {
        let inner = serde_json::json!({
            "primary": { "source_text": source.clone(), "target_text": "x" }
        })
        .to_string();
        let raw = serde_json::to_string(&inner).unwrap();

        let result = sanitize(&raw).unwrap();
        prop_assert_eq!(result.primary.source_text, source);
    }

    #[test]
    fn scalar_json_is_rejected_without_panic(n in any::<i64>()) {
        prop_assert!(matches!(sanitize(&n.to_string()), Err(PipelineError::Shape)));
    }

    #[test]
    fn arbitrary_text_never_panics(raw in "\\PC{0,64}") {
        let _ = sanitize(&raw);
    }
}
