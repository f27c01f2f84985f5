//! Turns untrusted generation output into a validated, persisted result.
//!
//! The flow is staged: fence-strip, parse, unwrap one level of double
//! encoding, shape-check, commit. Any failure short-circuits into a fixed,
//! schema-valid fallback result; the caller never sees an error.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::services::{flashcards, vocabulary};

pub const FALLBACK_SOURCE_TEXT: &str = "Error processing";
pub const FALLBACK_TARGET_TEXT: &str = "Não foi possível processar a resposta da IA.";

const FIELD_PLACEHOLDER: &str = "N/A";

fn field_placeholder() -> String {
    FIELD_PLACEHOLDER.to_string()
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("response is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("response JSON has no usable `primary` object")]
    Shape,
    #[error("storage write failed: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryCard {
    #[serde(default = "field_placeholder")]
    pub source_text: String,
    #[serde(default = "field_placeholder")]
    pub target_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightedWord {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub primary: PrimaryCard,
    #[serde(default)]
    pub highlighted_words: Vec<HighlightedWord>,
}

impl TranslationResult {
    pub fn fallback() -> Self {
        Self {
            primary: PrimaryCard {
                source_text: FALLBACK_SOURCE_TEXT.to_string(),
                target_text: FALLBACK_TARGET_TEXT.to_string(),
            },
            highlighted_words: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.primary.source_text == FALLBACK_SOURCE_TEXT && self.highlighted_words.is_empty()
    }
}

/// Entry point for raw generation output. Infallible: on any decode, shape
/// or storage problem the fixed fallback result is returned and nothing is
/// persisted by the failing path. The log carries the actual cause.
pub async fn process(pool: &SqlitePool, raw: &str) -> TranslationResult {
    let result = match sanitize(raw) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(error = %err, raw_len = raw.len(), "generation response rejected");
            return TranslationResult::fallback();
        }
    };

    match commit(pool, &result).await {
        Ok(new_words) => {
            tracing::info!(
                highlighted = result.highlighted_words.len(),
                new_words,
                "generation response committed"
            );
            result
        }
        Err(err) => {
            tracing::warn!(error = %err, "commit failed");
            TranslationResult::fallback()
        }
    }
}

/// Fence-strip, parse, unwrap double encoding, shape-check.
/// Pure; no storage access.
pub fn sanitize(raw: &str) -> Result<TranslationResult, PipelineError> {
    let candidate = strip_code_fences(raw);

    let value: serde_json::Value =
        serde_json::from_str(candidate).map_err(PipelineError::Decode)?;

    // Some models return the whole document encoded once more as a JSON
    // string. Unwrap exactly one level.
    let value = match value {
        serde_json::Value::String(inner) => {
            serde_json::from_str(&inner).map_err(PipelineError::Decode)?
        }
        other => other,
    };

    let has_primary = value
        .as_object()
        .map(|map| map.contains_key("primary"))
        .unwrap_or(false);
    if !has_primary {
        return Err(PipelineError::Shape);
    }

    serde_json::from_value(value).map_err(|_| PipelineError::Shape)
}

/// One flashcard plus the highlighted words, in a single transaction.
/// Words already known are silently skipped by the store.
async fn commit(pool: &SqlitePool, result: &TranslationResult) -> Result<usize, PipelineError> {
    let mut tx = pool.begin().await?;

    flashcards::append(
        &mut *tx,
        &result.primary.source_text,
        &result.primary.target_text,
    )
    .await?;

    let mut new_words = 0;
    for item in &result.highlighted_words {
        if vocabulary::normalize_word(&item.word).is_empty() {
            continue;
        }
        if vocabulary::remember(&mut *tx, &item.word, &item.translation, &item.context).await? {
            new_words += 1;
        }
    }

    tx.commit().await?;
    Ok(new_words)
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    for marker in ["```json", "```"] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            let body = rest.trim_end().strip_suffix("```").unwrap_or(rest);
            return body.trim();
        }
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fenced_json() {
        let raw = "```json\n{\"primary\": {}}\n```";
        assert_eq!(strip_code_fences(raw), "{\"primary\": {}}");
    }

    #[test]
    fn test_strip_bare_fence() {
        let raw = "```\n{\"primary\": {}}\n```";
        assert_eq!(strip_code_fences(raw), "{\"primary\": {}}");
    }

    #[test]
    fn test_strip_leaves_plain_text() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_unterminated_fence() {
        let raw = "```json\n{\"primary\": {}}";
        assert_eq!(strip_code_fences(raw), "{\"primary\": {}}");
    }

    #[test]
    fn test_sanitize_fence_round_trip() {
        let body = r#"{"primary": {"source_text": "cat", "target_text": "gato"}}"#;
        let fenced = format!("```json\n{body}\n```");

        assert_eq!(sanitize(body).unwrap(), sanitize(&fenced).unwrap());
    }

    #[test]
    fn test_sanitize_recovers_double_encoding() {
        let inner = r#"{"primary": {"source_text": "cat", "target_text": "gato"}}"#;
        let raw = serde_json::to_string(inner).unwrap();

        let result = sanitize(&raw).unwrap();
        assert_eq!(result.primary.source_text, "cat");
    }

    #[test]
    fn test_sanitize_only_one_extra_decode_level() {
        let inner = r#"{"primary": {}}"#;
        let once = serde_json::to_string(inner).unwrap();
        let twice = serde_json::to_string(&once).unwrap();

        assert!(sanitize(&once).is_ok());
        assert!(matches!(sanitize(&twice), Err(PipelineError::Decode(_))));
    }

    #[test]
    fn test_sanitize_rejects_garbage() {
        assert!(matches!(
            sanitize("not json at all"),
            Err(PipelineError::Decode(_))
        ));
    }

    #[test]
    fn test_sanitize_rejects_missing_primary() {
        assert!(matches!(
            sanitize(r#"{"highlighted_words": []}"#),
            Err(PipelineError::Shape)
        ));
    }

    #[test]
    fn test_sanitize_rejects_non_object() {
        assert!(matches!(sanitize("[1, 2, 3]"), Err(PipelineError::Shape)));
        assert!(matches!(
            sanitize(r#"{"primary": "not an object"}"#),
            Err(PipelineError::Shape)
        ));
    }

    #[test]
    fn test_sanitize_defaults_missing_primary_fields() {
        let result = sanitize(r#"{"primary": {}}"#).unwrap();
        assert_eq!(result.primary.source_text, "N/A");
        assert_eq!(result.primary.target_text, "N/A");
        assert!(result.highlighted_words.is_empty());
    }

    #[test]
    fn test_sanitize_defaults_missing_highlight_fields() {
        let raw = r#"{"primary": {"source_text": "a", "target_text": "b"},
                      "highlighted_words": [{"word": "cat"}]}"#;
        let result = sanitize(raw).unwrap();

        assert_eq!(result.highlighted_words.len(), 1);
        assert_eq!(result.highlighted_words[0].word, "cat");
        assert_eq!(result.highlighted_words[0].translation, "");
        assert_eq!(result.highlighted_words[0].context, "");
    }

    #[test]
    fn test_fallback_shape() {
        let fallback = TranslationResult::fallback();
        assert_eq!(fallback.primary.source_text, "Error processing");
        assert!(fallback.highlighted_words.is_empty());
        assert!(fallback.is_fallback());
    }
}
