//! Query command: run a structured query given as JSON

use crate::app::{OutputFormat, QueryArgs};
use crate::output::{format_movies, FormatOptions};
use anyhow::Result;
use cinequery_core::{CineQueryError, QueryExecutor, StructuredQuery};
use std::io::Read;

pub async fn run(
    args: QueryArgs,
    executor: &QueryExecutor,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let text = if args.json == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        args.json
    };

    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| CineQueryError::InvalidInput(format!("query is not valid JSON: {}", e)))?;
    let query = StructuredQuery::from_value(value).map_err(CineQueryError::from)?;
    let movies = executor.execute(&query).await?;

    print!(
        "{}",
        format_movies(&movies, format, &FormatOptions { full: verbose })?
    );
    Ok(())
}
