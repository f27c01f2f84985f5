//! Word memory backing the suppression list.
//!
//! A word is stored at most once, keyed by its normalized form. The first
//! discovered translation/context wins; re-discovery is a silent no-op.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::{Row, SqliteExecutor};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub word: String,
    pub translation: String,
    pub context: String,
    pub discovered_at: String,
}

/// Normalization applied on every read and write path. Case variants of the
/// same word must map to the same row or the suppression list leaks
/// duplicates back into the prompts.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

pub async fn known_words(
    executor: impl SqliteExecutor<'_>,
) -> Result<HashSet<String>, sqlx::Error> {
    let rows = sqlx::query(r#"SELECT "word" FROM "vocabulary""#)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(|row| row.get("word")).collect())
}

/// Insert-if-absent. Returns whether a new row was created; a duplicate is a
/// normal outcome, not an error. Uniqueness is enforced by the primary key,
/// not by a prior read.
pub async fn remember(
    executor: impl SqliteExecutor<'_>,
    word: &str,
    translation: &str,
    context: &str,
) -> Result<bool, sqlx::Error> {
    let normalized = normalize_word(word);

    let result = sqlx::query(
        r#"
        INSERT INTO "vocabulary" ("word", "translation", "context")
        VALUES (?, ?, ?)
        ON CONFLICT ("word") DO NOTHING
        "#,
    )
    .bind(&normalized)
    .bind(translation)
    .bind(context)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Idempotent removal. Returns whether a row existed.
pub async fn forget(executor: impl SqliteExecutor<'_>, word: &str) -> Result<bool, sqlx::Error> {
    let normalized = normalize_word(word);

    let result = sqlx::query(r#"DELETE FROM "vocabulary" WHERE "word" = ?"#)
        .bind(&normalized)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_entries(
    executor: impl SqliteExecutor<'_>,
) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "word", "translation", "context", "discovered_at"
        FROM "vocabulary"
        ORDER BY "discovered_at" DESC, "rowid" DESC
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let discovered_at: NaiveDateTime = row.get("discovered_at");
            VocabularyEntry {
                word: row.get("word"),
                translation: row.get("translation"),
                context: row.get("context"),
                discovered_at: format_naive_iso(discovered_at),
            }
        })
        .collect())
}

fn format_naive_iso(value: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(value, Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
