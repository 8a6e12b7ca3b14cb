//! Output formatters

pub mod csv;
pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use anyhow::Result;
use cinequery_core::{MovieDocument, StructuredQuery};

/// Format options
pub struct FormatOptions {
    /// Include the plot under each movie
    pub full: bool,
}

/// Format a list of movies
pub fn format_movies(
    movies: &[MovieDocument],
    format: OutputFormat,
    options: &FormatOptions,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => json::format_movies(movies),
        OutputFormat::Csv => csv::format_movies(movies)?,
        OutputFormat::Md => markdown::format_movies(movies, options),
        OutputFormat::Cli => terminal::format_movies(movies, options),
    })
}

/// Format a generated query followed by its results
pub fn format_answer(
    query: &StructuredQuery,
    movies: &[MovieDocument],
    format: OutputFormat,
    options: &FormatOptions,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => json::format_answer(query, movies),
        OutputFormat::Md => format!(
            "```json\n{}\n```\n\n{}",
            query.to_json_string(),
            markdown::format_movies(movies, options)
        ),
        // CSV stays machine-readable: rows only
        OutputFormat::Csv => csv::format_movies(movies)?,
        OutputFormat::Cli => format!(
            "Query: {}\n\n{}",
            query,
            terminal::format_movies(movies, options)
        ),
    })
}

pub(crate) fn join_list(list: &Option<Vec<String>>) -> String {
    list.as_deref().map(|l| l.join(", ")).unwrap_or_default()
}
