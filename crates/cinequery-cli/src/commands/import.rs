//! Import command

use crate::app::{ImportArgs, OutputFormat};
use anyhow::{Context, Result};
use cinequery_core::SqliteStore;

pub async fn run(args: ImportArgs, store: &SqliteStore, format: OutputFormat) -> Result<()> {
    let report = store
        .import_file(args.file.clone())
        .await
        .with_context(|| format!("importing {}", args.file.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            println!("Imported {}", args.file.display());
            println!("  Inserted:  {}", report.inserted);
            println!("  Updated:   {}", report.updated);
            println!("  Skipped:   {}", report.skipped);
        }
    }
    Ok(())
}
