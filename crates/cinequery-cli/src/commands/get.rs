//! Get command

use crate::app::{GetArgs, OutputFormat};
use crate::output::{format_movies, FormatOptions};
use anyhow::Result;
use cinequery_core::QueryExecutor;

pub async fn run(args: GetArgs, executor: &QueryExecutor, format: OutputFormat) -> Result<()> {
    let movie = executor.get_movie(&args.id).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&movie)?),
        _ => print!(
            "{}",
            format_movies(&[movie], format, &FormatOptions { full: true })?
        ),
    }
    Ok(())
}
