//! Translator against a local OpenAI-compatible endpoint

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use cinequery_core::{
    CineQueryError, Config, LLMServiceConfig, MemoryStore, MoviePipeline, QueryTranslator,
    TranslationError, TranslationRequest,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Clone)]
struct Fake {
    status: StatusCode,
    content: Option<&'static str>,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn completions(State(fake): State<Fake>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    fake.requests.lock().await.push(body);
    if !fake.status.is_success() {
        return (fake.status, Json(json!({"error": {"message": "model overloaded"}})));
    }
    let choices = match fake.content {
        Some(content) => json!([{"index": 0, "message": {"role": "assistant", "content": content}}]),
        None => json!([]),
    };
    (StatusCode::OK, Json(json!({"id": "cmpl-1", "choices": choices})))
}

/// Serve a fake completion endpoint and return its base URL
async fn serve(fake: Fake) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(fake);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn fake(status: StatusCode, content: Option<&'static str>) -> Fake {
    Fake {
        status,
        content,
        requests: Arc::new(Mutex::new(Vec::new())),
    }
}

fn service_config(url: String) -> LLMServiceConfig {
    LLMServiceConfig {
        url,
        model: "test-model".to_string(),
        api_key: Some("test-key".to_string()),
        timeout_secs: 5,
        temperature: 0.1,
        max_tokens: 1000,
    }
}

#[tokio::test]
async fn test_translate_sends_prompt_and_parses_object() {
    let fake = fake(
        StatusCode::OK,
        Some(r#"{"filter": {"genres": {"$in": ["Horror"]}}, "limit": 5}"#),
    );
    let requests = fake.requests.clone();
    let translator = QueryTranslator::from_config(service_config(serve(fake).await)).unwrap();

    let query = translator.translate("five horror movies").await.unwrap();
    assert_eq!(query.get("limit"), Some(&json!(5)));

    let requests = requests.lock().await;
    let sent = &requests[0];
    assert_eq!(sent["model"], "test-model");
    assert_eq!(sent["max_tokens"], 1000);
    assert!(sent["temperature"].as_f64().unwrap() < 0.2);
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][1]["content"], "five horror movies");
}

#[tokio::test]
async fn test_non_json_completion_is_a_translation_error() {
    let fake = fake(StatusCode::OK, Some("Sure! Here are some horror movies."));
    let translator = QueryTranslator::from_config(service_config(serve(fake).await)).unwrap();
    let err = translator.translate("horror").await.unwrap_err();
    assert!(matches!(err, TranslationError::MalformedJson(_)));
}

#[tokio::test]
async fn test_missing_choice_is_empty_completion() {
    let fake = fake(StatusCode::OK, None);
    let translator = QueryTranslator::from_config(service_config(serve(fake).await)).unwrap();
    let err = translator.translate("horror").await.unwrap_err();
    assert!(matches!(err, TranslationError::EmptyCompletion));
}

#[tokio::test]
async fn test_upstream_status_is_reported_once() {
    let fake = fake(StatusCode::SERVICE_UNAVAILABLE, None);
    let requests = fake.requests.clone();
    let translator = QueryTranslator::from_config(service_config(serve(fake).await)).unwrap();

    let err = translator.translate("horror").await.unwrap_err();
    match err {
        TranslationError::Upstream { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("model overloaded"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(requests.lock().await.len(), 1);
}

#[tokio::test]
async fn test_unreachable_service_is_a_translation_error() {
    // Bind then drop so the port is closed
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let translator = QueryTranslator::from_config(service_config(url)).unwrap();
    let err = translator.translate("horror").await.unwrap_err();
    assert!(matches!(
        err,
        TranslationError::Transport(_) | TranslationError::Timeout(_)
    ));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"id": "cmpl-slow", "choices": []}))
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = LLMServiceConfig {
        timeout_secs: 1,
        ..service_config(url)
    };
    let translator = QueryTranslator::from_config(config).unwrap();
    let err = translator.translate("horror").await.unwrap_err();
    assert!(matches!(err, TranslationError::Timeout(_)), "got {err}");
}

#[tokio::test]
async fn test_pipeline_short_circuits_on_translation_failure() {
    let fake = fake(StatusCode::OK, Some("[]"));
    let mut config = Config::default();
    config.llm_service = service_config(serve(fake).await);

    let store = MemoryStore::with_documents(vec![json!({"_id": "1", "title": "Alien"})]);
    let pipeline = MoviePipeline::with_store(&config, Arc::new(store)).unwrap();
    let request = TranslationRequest::new("anything").unwrap();

    let err = pipeline.translate_and_execute(&request).await.unwrap_err();
    assert!(matches!(
        err,
        CineQueryError::Translation(TranslationError::NotAnObject("array"))
    ));
    assert!(err.to_string().starts_with("Failed to generate query"));
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let fake = fake(
        StatusCode::OK,
        Some(r#"{"filter": {"genres": {"$in": ["Horror"]}}, "projection": {"title": 1}}"#),
    );
    let mut config = Config::default();
    config.llm_service = service_config(serve(fake).await);

    let store = MemoryStore::with_documents(vec![
        json!({"_id": "1", "title": "Alien", "genres": ["Horror", "Sci-Fi"]}),
        json!({"_id": "2", "title": "Heat", "genres": ["Crime"]}),
    ]);
    let pipeline = MoviePipeline::with_store(&config, Arc::new(store)).unwrap();

    let answer = pipeline
        .translate_and_execute(&TranslationRequest::new("scary films").unwrap())
        .await
        .unwrap();
    assert_eq!(answer.result.len(), 1);
    assert_eq!(answer.result[0].display_title(), "Alien");
    assert!(answer.result[0].genres.is_none());
    assert_eq!(
        answer.query_text(),
        r#"{"filter":{"genres":{"$in":["Horror"]}},"projection":{"title":1}}"#
    );
}
