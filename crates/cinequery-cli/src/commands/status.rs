//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use cinequery_core::{Config, SqliteStore};
use serde_json::json;

pub async fn run(store: &SqliteStore, config: &Config, format: OutputFormat) -> Result<()> {
    let stats = store.stats().await?;

    match format {
        OutputFormat::Json => {
            let body = json!({
                "database": config.database.path,
                "model": config.llm_service.model,
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        _ => {
            println!("Database:        {}", config.database.path.display());
            println!("Model:           {}", config.llm_service.model);
            println!();
            println!("Movies:          {}", stats.movie_count);
            println!("Genres:          {}", stats.genre_count);
            match (stats.earliest_year, stats.latest_year) {
                (Some(first), Some(last)) => println!("Years:           {}-{}", first, last),
                _ => println!("Years:           -"),
            }
            println!(
                "Last import:     {}",
                stats.last_import.as_deref().unwrap_or("never")
            );
            for source in &stats.sources {
                println!("  Source:        {}", source);
            }
        }
    }
    Ok(())
}
