//! Router tests driven through `tower::ServiceExt::oneshot`

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use cinequery_core::{
    ChatMessage, CompletionClient, CompletionOptions, MemoryStore, MoviePipeline, QueryExecutor,
    QueryTranslator, TranslationError,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Completion client with a fixed reply that counts its calls
struct Scripted {
    reply: Result<&'static str, u16>,
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionClient for Scripted {
    async fn chat_completion(
        &self,
        _messages: Vec<ChatMessage>,
        _options: &CompletionOptions,
    ) -> Result<Option<String>, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Ok(text) => Ok(Some(text.to_string())),
            Err(status) => Err(TranslationError::Upstream {
                status,
                body: "rate limited".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn app(reply: Result<&'static str, u16>) -> (Router, Arc<Scripted>) {
    let client = Arc::new(Scripted {
        reply,
        calls: AtomicUsize::new(0),
    });
    let store = MemoryStore::with_documents(vec![
        json!({"_id": "tt-alien", "title": "Alien", "year": 1979, "genres": ["Horror", "Sci-Fi"],
               "directors": ["Ridley Scott"], "imdb": {"rating": 8.5}}),
        json!({"_id": "tt-memento", "title": "Memento", "year": 2000, "genres": ["Mystery"],
               "directors": ["Christopher Nolan"], "imdb": {"rating": 8.4}}),
        json!({"_id": "tt-thing", "title": "The Thing", "year": 1982, "genres": ["Horror"],
               "directors": ["John Carpenter"], "imdb": {"rating": 8.2}}),
    ]);
    let pipeline = MoviePipeline::new(
        QueryTranslator::new(client.clone()),
        QueryExecutor::new(Arc::new(store)),
    );
    (cinequery_http::router(Arc::new(pipeline)), client)
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_returns_query_text_and_results() {
    let (app, _) = app(Ok(r#"{"filter": {"genres": {"$in": ["Horror"]}}, "sort": {"imdb.rating": -1}, "limit": 5}"#));

    let response = app
        .oneshot(chat_request(r#"{"message": "best horror movies"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(
        body["query"],
        r#"{"filter":{"genres":{"$in":["Horror"]}},"sort":{"imdb.rating":-1},"limit":5}"#
    );
    let titles: Vec<&str> = body["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Alien", "The Thing"]);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_chat_rejects_missing_or_blank_message() {
    for body in [r#"{}"#, r#"{"message": 42}"#, r#"{"message": "   "}"#, "not json"] {
        let (app, client) = app(Ok("{}"));
        let response = app.oneshot(chat_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");

        let body = json_body(response).await;
        assert_eq!(body["query"], "");
        assert_eq!(body["result"], json!([]));
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_chat_upstream_failure_is_500() {
    let (app, client) = app(Err(429));

    let response = app
        .oneshot(chat_request(r#"{"message": "horror"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to process chat message: Failed to generate query"));
    assert!(error.contains("429"));
    assert_eq!(body["result"], json!([]));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_chat_invalid_query_is_500() {
    let (app, _) = app(Ok(r#"{"limit": 5}"#));

    let response = app
        .oneshot(chat_request(r#"{"message": "anything"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid query"));
}

#[tokio::test]
async fn test_search() {
    let (app, client) = app(Ok("{}"));

    let response = app.clone().oneshot(get("/api/search?q=NOLAN")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Memento");

    let response = app.oneshot(get("/api/search?q=")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Search query is required");

    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_without_parameter() {
    let (app, _) = app(Ok("{}"));
    let response = app.oneshot(get("/api/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_movie() {
    let (app, _) = app(Ok("{}"));

    let response = app.clone().oneshot(get("/api/movies/tt-thing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["title"], "The Thing");

    let response = app.oneshot(get("/api/movies/tt-missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(Ok("{}"));

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}
