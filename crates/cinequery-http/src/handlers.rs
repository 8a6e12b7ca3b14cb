//! Request handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cinequery_core::{CineQueryError, MoviePipeline, TranslationRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const INVALID_CHAT_REQUEST: &str = "Invalid request: message is required and must be a string";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

fn chat_failure(status: StatusCode, error: String) -> Response {
    (
        status,
        Json(json!({ "query": "", "result": [], "error": error })),
    )
        .into_response()
}

/// Translate the message, run the query and return both.
///
/// Bodies that are not JSON or lack a string `message` get the same 400.
pub async fn chat(
    State(pipeline): State<Arc<MoviePipeline>>,
    body: Option<Json<ChatRequest>>,
) -> Response {
    let message = match body.and_then(|Json(req)| req.message) {
        Some(Value::String(message)) => message,
        _ => return chat_failure(StatusCode::BAD_REQUEST, INVALID_CHAT_REQUEST.to_string()),
    };

    let request = match TranslationRequest::new(message) {
        Ok(request) => request,
        Err(_) => return chat_failure(StatusCode::BAD_REQUEST, INVALID_CHAT_REQUEST.to_string()),
    };

    match pipeline.translate_and_execute(&request).await {
        Ok(answer) => {
            tracing::info!("Query returned {} results", answer.result.len());
            (
                StatusCode::OK,
                Json(json!({ "query": answer.query_text(), "result": answer.result })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Chat endpoint error: {}", e);
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            chat_failure(status, format!("Failed to process chat message: {}", e))
        }
    }
}

pub async fn search(
    State(pipeline): State<Arc<MoviePipeline>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let term = match params.q {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Search query is required" })),
            )
                .into_response()
        }
    };

    match pipeline.search(&term).await {
        Ok(movies) => (StatusCode::OK, Json(movies)).into_response(),
        Err(e) => {
            tracing::error!("Search endpoint error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to search movies" })),
            )
                .into_response()
        }
    }
}

pub async fn get_movie(
    State(pipeline): State<Arc<MoviePipeline>>,
    Path(id): Path<String>,
) -> Response {
    match pipeline.get_movie(&id).await {
        Ok(movie) => (StatusCode::OK, Json(movie)).into_response(),
        Err(e @ CineQueryError::MovieNotFound(_)) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            tracing::error!("Movie lookup error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch movie" })),
            )
                .into_response()
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
