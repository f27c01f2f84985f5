use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::response::json_error;
use crate::services::pipeline::TranslationResult;
use crate::services::{pipeline, prompt, vocabulary};
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranslateTextRequest {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranslateImageRequest {
    image_base64: Option<String>,
}

pub async fn translate_text(
    State(state): State<AppState>,
    Json(req): Json<TranslateTextRequest>,
) -> Response {
    let Some(text) = req
        .text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
    else {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Texto não fornecido")
            .into_response();
    };

    let known = match suppression_list(&state).await {
        Ok(known) => known,
        Err(response) => return response,
    };

    let provider = state.generation();
    if !provider.is_available() {
        return generation_unavailable();
    }

    let request_prompt = prompt::text_prompt(&text, &known);
    let raw = match provider.generate_text(&request_prompt).await {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(error = %err, "text generation request failed");
            return generation_failed();
        }
    };

    respond(pipeline::process(state.pool(), &raw).await)
}

pub async fn translate_image(
    State(state): State<AppState>,
    Json(req): Json<TranslateImageRequest>,
) -> Response {
    let Some(encoded) = req.image_base64.filter(|v| !v.trim().is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Imagem não fornecida")
            .into_response();
    };

    let image = match BASE64.decode(encoded.trim()) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(error = %err, "image payload rejected");
            return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Imagem inválida")
                .into_response();
        }
    };

    let known = match suppression_list(&state).await {
        Ok(known) => known,
        Err(response) => return response,
    };

    let provider = state.generation();
    if !provider.is_available() {
        return generation_unavailable();
    }

    let request_prompt = prompt::image_prompt(&known);
    let raw = match provider.generate_with_image(&request_prompt, &image).await {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(error = %err, "image generation request failed");
            return generation_failed();
        }
    };

    respond(pipeline::process(state.pool(), &raw).await)
}

async fn suppression_list(state: &AppState) -> Result<Vec<String>, Response> {
    match vocabulary::known_words(state.pool()).await {
        Ok(words) => {
            let mut list: Vec<String> = words.into_iter().collect();
            list.sort();
            tracing::info!(ignored = list.len(), "suppression list loaded");
            Ok(list)
        }
        Err(err) => {
            tracing::warn!(error = %err, "known words query failed");
            Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Erro interno do servidor",
            )
            .into_response())
        }
    }
}

fn respond(result: TranslationResult) -> Response {
    Json(SuccessResponse {
        success: true,
        data: result,
    })
    .into_response()
}

fn generation_unavailable() -> Response {
    json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "GENERATION_UNAVAILABLE",
        "Serviço de IA não configurado",
    )
    .into_response()
}

fn generation_failed() -> Response {
    json_error(
        StatusCode::BAD_GATEWAY,
        "GENERATION_ERROR",
        "Falha ao consultar o serviço de IA",
    )
    .into_response()
}
