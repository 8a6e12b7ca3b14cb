//! Search command: lexical fallback search

use super::joined;
use crate::app::{OutputFormat, SearchArgs};
use crate::output::{format_movies, FormatOptions};
use anyhow::Result;
use cinequery_core::{CineQueryError, QueryExecutor};

pub async fn run(
    args: SearchArgs,
    executor: &QueryExecutor,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = joined(&args.term);
    if term.trim().is_empty() {
        return Err(CineQueryError::InvalidInput("search term is required".to_string()).into());
    }

    let movies = executor.search(&term).await?;
    print!(
        "{}",
        format_movies(&movies, format, &FormatOptions { full: verbose })?
    );
    Ok(())
}
