mod health;
mod translate;
mod vocabulary;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .route("/api/translate/text", post(translate::translate_text))
        .route("/api/translate/image", post(translate::translate_image))
        .route("/api/vocabulary", get(vocabulary::list_vocabulary))
        .route("/api/vocabulary/:word", delete(vocabulary::forget_word))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Rota não encontrada").into_response()
}
