//! JSON output formatter

use cinequery_core::{MovieDocument, StructuredQuery};
use serde_json::json;

pub fn format_movies(movies: &[MovieDocument]) -> String {
    let mut output = serde_json::to_string_pretty(movies).unwrap_or_else(|_| "[]".to_string());
    output.push('\n');
    output
}

/// Same shape as the HTTP chat response body
pub fn format_answer(query: &StructuredQuery, movies: &[MovieDocument]) -> String {
    let body = json!({
        "query": query.to_json_string(),
        "result": movies,
    });
    let mut output = serde_json::to_string_pretty(&body).unwrap_or_else(|_| "{}".to_string());
    output.push('\n');
    output
}
