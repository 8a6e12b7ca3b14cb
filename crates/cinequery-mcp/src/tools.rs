//! MCP tool definitions and handlers

use crate::protocol::*;
use crate::resources::{movie_uri, read_resource};
use anyhow::Result;
use cinequery_core::{MovieDocument, MoviePipeline, StructuredQuery, TranslationRequest, SEARCH_LIMIT};
use serde_json::{json, Value};

pub fn ask_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "ask_movies".to_string(),
        description: "Answer a question about the movie catalog by translating it into a structured query and running it".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "Question in natural language (e.g. 'top 5 horror movies from the 80s')"
                }
            },
            "required": ["question"]
        }),
    }
}

pub fn translate_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "translate_question".to_string(),
        description: "Translate a question into a structured query without running it".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "Question in natural language"
                }
            },
            "required": ["question"]
        }),
    }
}

pub fn query_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "run_query".to_string(),
        description: "Run a structured query (filter, projection, sort, skip, limit) against the catalog".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "object",
                    "description": "Query object, e.g. {\"filter\": {\"genres\": {\"$in\": [\"Horror\"]}}, \"limit\": 5}",
                    "properties": {
                        "filter": { "type": "object" },
                        "projection": { "type": "object" },
                        "sort": { "type": "object" },
                        "skip": { "type": "integer", "minimum": 0 },
                        "limit": { "type": "integer", "minimum": 0 }
                    },
                    "required": ["filter"]
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn search_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "search_movies".to_string(),
        description: format!(
            "Case-insensitive keyword search over title, plot, directors and cast (at most {} results)",
            SEARCH_LIMIT
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "term": {
                    "type": "string",
                    "description": "Search term"
                }
            },
            "required": ["term"]
        }),
    }
}

pub fn get_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_movie".to_string(),
        description: "Get one movie by id".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "Movie id, plain or 24-hex ObjectId"
                }
            },
            "required": ["id"]
        }),
    }
}

pub fn status_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "status".to_string(),
        description: "Show catalog and completion service status".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

/// Every tool this server exposes
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ask_tool_definition(),
        translate_tool_definition(),
        query_tool_definition(),
        search_tool_definition(),
        get_tool_definition(),
        status_tool_definition(),
    ]
}

fn string_arg<'a>(args: &'a Value, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing {}", name))
}

fn movie_summary(movies: &[MovieDocument]) -> String {
    let mut summary = format!("Found {} movies", movies.len());
    for m in movies {
        summary.push_str(&format!("\n  - {}", m.display_title()));
        if let Some(year) = m.year {
            summary.push_str(&format!(" ({})", year));
        }
    }
    summary
}

pub async fn handle_ask(pipeline: &MoviePipeline, args: Value) -> Result<ToolResult> {
    let request = TranslationRequest::new(string_arg(&args, "question")?)?;
    let answer = pipeline.translate_and_execute(&request).await?;

    let text = format!(
        "Query: {}\n{}",
        answer.query_text(),
        movie_summary(&answer.result)
    );
    Ok(ToolResult::text(
        text,
        Some(json!({
            "query": answer.query_text(),
            "result": answer.result,
        })),
    ))
}

pub async fn handle_translate(pipeline: &MoviePipeline, args: Value) -> Result<ToolResult> {
    let request = TranslationRequest::new(string_arg(&args, "question")?)?;
    let query = pipeline.translate(&request).await?;

    Ok(ToolResult::text(
        query.to_json_string(),
        Some(json!({ "query": query })),
    ))
}

pub async fn handle_query(pipeline: &MoviePipeline, args: Value) -> Result<ToolResult> {
    let query = args
        .get("query")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Missing query"))?;
    // Clients sometimes pass the query serialized as a string
    let query = match query {
        Value::String(text) => serde_json::from_str(&text)?,
        other => other,
    };
    let query = StructuredQuery::from_value(query)?;
    let movies = pipeline.execute(&query).await?;

    Ok(ToolResult::text(
        movie_summary(&movies),
        Some(json!({ "result": movies })),
    ))
}

pub async fn handle_search(pipeline: &MoviePipeline, args: Value) -> Result<ToolResult> {
    let term = string_arg(&args, "term")?;
    if term.trim().is_empty() {
        anyhow::bail!("Search term must not be empty");
    }
    let movies = pipeline.search(term).await?;

    Ok(ToolResult::text(
        format!("{} for \"{}\"", movie_summary(&movies), term),
        Some(json!({ "result": movies })),
    ))
}

pub async fn handle_get(pipeline: &MoviePipeline, args: Value) -> Result<ToolResult> {
    let id = string_arg(&args, "id")?;
    let resource = read_resource(pipeline, &movie_uri(id)).await?;

    Ok(ToolResult {
        content: vec![Content::Resource { resource }],
        structured_content: None,
        is_error: None,
    })
}

pub async fn handle_status(pipeline: &MoviePipeline) -> Result<ToolResult> {
    let store = pipeline.executor().store();
    let count = store.count_documents().await?;
    let model = pipeline.translator().client().model_name().to_string();

    let summary = format!(
        "Catalog: {} movies ({} store)\nModel: {}",
        count,
        store.name(),
        model
    );
    let mut structured = json!({
        "movies": count,
        "store": store.name(),
        "model": model,
    });
    if let Some(metrics) = pipeline.translator().client().metrics() {
        structured["completions"] = serde_json::to_value(metrics)?;
    }

    Ok(ToolResult::text(summary, Some(structured)))
}
