//! MCP tools and JSON-RPC dispatch over an in-memory catalog

use async_trait::async_trait;
use cinequery_core::{
    ChatMessage, CompletionClient, CompletionOptions, MemoryStore, MoviePipeline, QueryExecutor,
    QueryTranslator, TranslationError,
};
use cinequery_mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use cinequery_mcp::tools::*;
use cinequery_mcp::McpServer;
use serde_json::{json, Value};
use std::sync::Arc;

/// Completion client that always answers with the same text
struct FixedReply(&'static str);

#[async_trait]
impl CompletionClient for FixedReply {
    async fn chat_completion(
        &self,
        _messages: Vec<ChatMessage>,
        _options: &CompletionOptions,
    ) -> Result<Option<String>, TranslationError> {
        Ok(Some(self.0.to_string()))
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

fn pipeline(reply: &'static str) -> MoviePipeline {
    let store = MemoryStore::with_documents(vec![
        json!({"_id": {"$oid": "573a1396f29313caabce1f0e"}, "title": "Alien", "year": 1979,
               "genres": ["Horror", "Sci-Fi"], "directors": ["Ridley Scott"]}),
        json!({"_id": "tt-heat", "title": "Heat", "year": 1995, "genres": ["Crime"],
               "directors": ["Michael Mann"]}),
        json!({"_id": "tt-thing", "title": "The Thing", "year": 1982, "genres": ["Horror"],
               "directors": ["John Carpenter"]}),
    ]);
    MoviePipeline::new(
        QueryTranslator::new(Arc::new(FixedReply(reply))),
        QueryExecutor::new(Arc::new(store)),
    )
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

#[tokio::test]
async fn test_ask_returns_query_and_movies() {
    let pipeline = pipeline(r#"{"filter": {"genres": {"$in": ["Horror"]}}, "sort": {"year": -1}}"#);
    let result = handle_ask(&pipeline, json!({"question": "scary movies"}))
        .await
        .unwrap();
    let result = to_json(&result);

    let structured = &result["structuredContent"];
    assert_eq!(
        structured["query"],
        r#"{"filter":{"genres":{"$in":["Horror"]}},"sort":{"year":-1}}"#
    );
    let titles: Vec<&str> = structured["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["The Thing", "Alien"]);
    assert!(result.get("isError").is_none());
}

#[tokio::test]
async fn test_ask_rejects_blank_question() {
    let pipeline = pipeline("{}");
    assert!(handle_ask(&pipeline, json!({"question": "  "})).await.is_err());
    assert!(handle_ask(&pipeline, json!({})).await.is_err());
}

#[tokio::test]
async fn test_run_query_accepts_object_or_string() {
    let pipeline = pipeline("{}");

    let from_object = handle_query(
        &pipeline,
        json!({"query": {"filter": {"year": {"$lt": 1990}}, "projection": {"title": 1}}}),
    )
    .await
    .unwrap();
    let from_string = handle_query(
        &pipeline,
        json!({"query": r#"{"filter": {"year": {"$lt": 1990}}, "projection": {"title": 1}}"#}),
    )
    .await
    .unwrap();

    assert_eq!(
        to_json(&from_object)["structuredContent"],
        to_json(&from_string)["structuredContent"]
    );
    assert_eq!(
        to_json(&from_object)["structuredContent"]["result"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_search_and_get() {
    let pipeline = pipeline("{}");

    let found = to_json(&handle_search(&pipeline, json!({"term": "carpenter"})).await.unwrap());
    assert_eq!(found["structuredContent"]["result"][0]["title"], "The Thing");

    let movie = to_json(
        &handle_get(&pipeline, json!({"id": "573a1396f29313caabce1f0e"}))
            .await
            .unwrap(),
    );
    let resource = &movie["content"][0]["resource"];
    assert_eq!(resource["uri"], "cinequery://movie/573a1396f29313caabce1f0e");
    assert_eq!(resource["mimeType"], "application/json");
    assert!(resource["text"].as_str().unwrap().contains("Ridley Scott"));

    assert!(handle_get(&pipeline, json!({"id": "missing"})).await.is_err());
}

#[tokio::test]
async fn test_status_reports_store() {
    let pipeline = pipeline("{}");
    let status = to_json(&handle_status(&pipeline).await.unwrap());
    assert_eq!(status["structuredContent"]["movies"], 3);
    assert_eq!(status["structuredContent"]["store"], "memory");
    assert_eq!(status["structuredContent"]["model"], "fixed");
}

#[tokio::test]
async fn test_serve_dispatches_lines() {
    let pipeline = pipeline("this is not json");
    let server = McpServer::new(&pipeline);

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}).to_string(),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}).to_string(),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "ask_movies", "arguments": {"question": "horror"}}})
        .to_string(),
        "{not json".to_string(),
        json!({"jsonrpc": "2.0", "id": 4, "method": "nope"}).to_string(),
    ]
    .join("\n");

    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let responses: Vec<JsonRpcResponse> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    // the notification gets no response
    assert_eq!(responses.len(), 5);

    let init = responses[0].result.as_ref().unwrap();
    assert_eq!(init["serverInfo"]["name"], "cinequery");

    let tools = responses[1].result.as_ref().unwrap()["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 6);

    let failed_call = responses[2].result.as_ref().unwrap();
    assert_eq!(failed_call["isError"], true);
    assert!(failed_call["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Failed to generate query"));

    assert_eq!(responses[3].error.as_ref().unwrap().code, -32700);
    assert_eq!(responses[4].error.as_ref().unwrap().code, -32601);
    assert_eq!(responses[4].id, Some(json!(4)));
}

#[tokio::test]
async fn test_listed_prompt_can_be_fetched() {
    let pipeline = pipeline("{}");
    let server = McpServer::new(&pipeline);
    let request = |value: Value| -> JsonRpcRequest { serde_json::from_value(value).unwrap() };

    let listed = server
        .handle_request(&request(json!({"jsonrpc": "2.0", "id": 1, "method": "prompts/list"})))
        .await;
    let prompts = listed.result.unwrap()["prompts"].as_array().unwrap().clone();
    assert_eq!(prompts.len(), 1);
    let name = prompts[0]["name"].as_str().unwrap().to_string();

    let fetched = server
        .handle_request(&request(json!({"jsonrpc": "2.0", "id": 2, "method": "prompts/get",
            "params": {"name": name, "arguments": {"question": "best heist movies"}}})))
        .await;
    assert!(fetched.error.is_none());
    let message = &fetched.result.unwrap()["messages"][0];
    assert_eq!(message["role"], "user");
    assert!(message["content"]["text"]
        .as_str()
        .unwrap()
        .contains("best heist movies"));

    let unknown = server
        .handle_request(&request(json!({"jsonrpc": "2.0", "id": 3, "method": "prompts/get",
            "params": {"name": "summarize"}})))
        .await;
    assert_eq!(unknown.error.unwrap().code, -32602);

    let missing = server
        .handle_request(&request(json!({"jsonrpc": "2.0", "id": 4, "method": "prompts/get",
            "params": {"name": name}})))
        .await;
    assert_eq!(missing.error.unwrap().code, -32602);
}
