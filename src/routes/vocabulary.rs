use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::response::json_error;
use crate::services::vocabulary;
use crate::services::vocabulary::VocabularyEntry;
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct ForgetResponse {
    success: bool,
    removed: bool,
}

pub async fn list_vocabulary(State(state): State<AppState>) -> Response {
    let entries: Vec<VocabularyEntry> = match vocabulary::list_entries(state.pool()).await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, "vocabulary list query failed");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Erro interno do servidor",
            )
            .into_response();
        }
    };

    Json(SuccessResponse {
        success: true,
        data: entries,
    })
    .into_response()
}

pub async fn forget_word(State(state): State<AppState>, Path(word): Path<String>) -> Response {
    match vocabulary::forget(state.pool(), &word).await {
        Ok(removed) => {
            if removed {
                tracing::info!(%word, "vocabulary entry removed");
            }
            Json(ForgetResponse {
                success: true,
                removed,
            })
            .into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, %word, "vocabulary delete failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Erro interno do servidor",
            )
            .into_response()
        }
    }
}
