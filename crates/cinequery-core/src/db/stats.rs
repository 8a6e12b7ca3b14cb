//! Database statistics

use super::Database;
use crate::error::Result;
use std::collections::BTreeSet;

/// Catalog stats
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DatabaseStats {
    pub movie_count: usize,
    pub genre_count: usize,
    pub earliest_year: Option<i64>,
    pub latest_year: Option<i64>,
    pub last_import: Option<String>,
    /// Files the catalog was imported from
    pub sources: Vec<String>,
}

impl Database {
    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let movie_count = self.count_movies()?;

        let (earliest_year, latest_year): (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(year), MAX(year) FROM movies WHERE year IS NOT NULL",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let last_import: Option<String> = self
            .conn
            .query_row("SELECT MAX(imported_at) FROM movies", [], |row| row.get(0))
            .unwrap_or(None);

        let mut genres = BTreeSet::new();
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT value FROM movies, json_each(movies.doc, '$.genres')
             WHERE json_valid(movies.doc) AND json_type(movies.doc, '$.genres') = 'array'
               AND json_each.type = 'text'",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;
        for genre in rows {
            if let Some(genre) = genre? {
                genres.insert(genre);
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT source FROM movies WHERE source IS NOT NULL ORDER BY source",
        )?;
        let sources = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(DatabaseStats {
            movie_count,
            genre_count: genres.len(),
            earliest_year,
            latest_year,
            last_import,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_over_catalog() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        assert_eq!(db.get_stats().unwrap().movie_count, 0);

        db.import_str(
            r#"[{"_id": "1", "year": 1931, "genres": ["Horror"]},
                {"_id": "2", "year": 2014, "genres": ["Horror", "Drama"]},
                {"_id": "3", "genres": "Drama"}]"#,
            None,
        )
        .unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.movie_count, 3);
        assert_eq!(stats.genre_count, 2);
        assert_eq!(stats.earliest_year, Some(1931));
        assert_eq!(stats.latest_year, Some(2014));
        assert!(stats.last_import.is_some());
        assert!(stats.sources.is_empty());

        db.import_str(r#"{"_id": "4", "title": "Alien"}"#, Some("scifi.ndjson"))
            .unwrap();
        db.import_str(r#"{"_id": "1", "year": 1931}"#, Some("horror.json"))
            .unwrap();
        assert_eq!(
            db.get_stats().unwrap().sources,
            vec!["horror.json".to_string(), "scifi.ndjson".to_string()]
        );
    }
}
