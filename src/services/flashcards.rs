//! Append-only flashcard log. Rows are never updated or deleted here.

use sqlx::SqliteExecutor;

pub async fn append(
    executor: impl SqliteExecutor<'_>,
    source_text: &str,
    target_text: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO "flashcards" ("source_text", "target_text")
        VALUES (?, ?)
        "#,
    )
    .bind(source_text)
    .bind(target_text)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}
