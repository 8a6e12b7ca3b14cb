// Basic query example using Cinequery as a library

use cinequery_core::{Database, QueryExecutor, SqliteStore, StructuredQuery};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> cinequery_core::Result<()> {
    println!("Cinequery Basic Query Example\n");

    let db_path = std::env::temp_dir().join("cinequery_example.sqlite");
    println!("Opening database at: {}", db_path.display());
    let db = Database::open(&db_path)?;
    db.initialize()?;

    println!("Importing sample movies...");
    let report = db.import_str(
        r#"[
            {"_id": "m1", "title": "Alien", "year": 1979, "genres": ["Horror", "Sci-Fi"], "imdb": {"rating": 8.5}},
            {"_id": "m2", "title": "Heat", "year": 1995, "genres": ["Crime", "Drama"], "imdb": {"rating": 8.3}},
            {"_id": "m3", "title": "The Thing", "year": 1982, "genres": ["Horror", "Mystery"], "imdb": {"rating": 8.2}}
        ]"#,
        Some("example"),
    )?;
    println!("  {} new, {} replaced\n", report.inserted, report.updated);

    let executor = QueryExecutor::new(Arc::new(SqliteStore::new(db)));

    // The same shape the translator produces
    let query = StructuredQuery::from_value(json!({
        "filter": {"genres": {"$in": ["Horror"]}},
        "projection": {"title": 1, "imdb.rating": 1},
        "sort": {"imdb.rating": -1},
        "limit": 10
    }))?;

    println!("Query: {}", query);
    for movie in executor.execute(&query).await? {
        println!(
            "  {} ({})",
            movie.display_title(),
            movie
                .imdb_rating()
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| "-".to_string())
        );
    }

    println!("\nSearch \"heat\":");
    for movie in executor.search("heat").await? {
        println!("  {}", movie.display_title());
    }

    Ok(())
}
