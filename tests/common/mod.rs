use axum::Router;
use sqlx::SqlitePool;
use tempfile::TempDir;

use linguacard_backend::services::generation::GenerationProvider;
use linguacard_backend::state::AppState;

pub async fn create_test_pool() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let pool = linguacard_backend::db::connect(&db_path)
        .await
        .expect("failed to create pool");

    (temp_dir, pool)
}

pub async fn create_test_app() -> (TempDir, Router) {
    std::env::remove_var("LLM_API_KEY");

    let (temp_dir, pool) = create_test_pool().await;
    let state = AppState::new(pool, GenerationProvider::from_env());

    (temp_dir, linguacard_backend::create_app(state))
}
