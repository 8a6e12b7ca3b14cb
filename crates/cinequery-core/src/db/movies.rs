//! Movie document operations

use super::Database;
use crate::error::{CineQueryError, ExecutionError, Result};
use crate::movie::MovieId;
use crate::query::{value::as_number, CompiledFind};
use crate::store::FindOptions;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Whether an upsert created or replaced a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Outcome of importing a batch of documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Row key for an `_id` value: `$oid` strings, plain strings and integers
pub fn movie_key(id: &Value) -> Option<String> {
    MovieId::from_value(id).map(|id| id.to_string())
}

/// Content-derived id for documents imported without `_id`
fn generated_id(doc: &Map<String, Value>) -> String {
    let text = Value::Object(doc.clone()).to_string();
    let hash = blake3::hash(text.as_bytes()).to_hex();
    hash.as_str()[..24].to_string()
}

impl Database {
    /// Insert a movie, replacing any stored movie with the same `_id`.
    ///
    /// A replaced movie keeps its position in natural order.
    pub fn upsert_movie(&self, doc: Value, source: Option<&str>) -> Result<UpsertOutcome> {
        let Value::Object(mut doc) = doc else {
            return Err(CineQueryError::InvalidInput(
                "movie must be a JSON object".to_string(),
            ));
        };

        let key = match doc.get("_id") {
            Some(id) => movie_key(id).ok_or_else(|| {
                CineQueryError::InvalidInput(format!("unsupported _id value: {}", id))
            })?,
            None => {
                let key = generated_id(&doc);
                let mut with_id = Map::with_capacity(doc.len() + 1);
                with_id.insert("_id".to_string(), Value::String(key.clone()));
                with_id.extend(doc);
                doc = with_id;
                key
            }
        };

        let title = doc.get("title").and_then(Value::as_str).map(str::to_string);
        let year = doc.get("year").and_then(as_number).map(|y| y.trunc() as i64);
        let text = Value::Object(doc).to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let existed: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM movies WHERE id = ?1)",
            params![key],
            |row| row.get(0),
        )?;

        self.conn.execute(
            "INSERT INTO movies (id, doc, title, year, imported_at, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                doc = excluded.doc,
                title = excluded.title,
                year = excluded.year,
                imported_at = excluded.imported_at,
                source = excluded.source",
            params![key, text, title, year, now, source],
        )?;

        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        })
    }

    /// Import a JSON array of movies or newline-delimited JSON.
    ///
    /// The batch is applied in one transaction. Entries that are not objects
    /// or carry an unusable `_id` are skipped.
    pub fn import_str(&self, content: &str, source: Option<&str>) -> Result<ImportReport> {
        let docs = parse_documents(content)?;
        let tx = self.conn.unchecked_transaction()?;
        let mut report = ImportReport::default();

        for (index, doc) in docs.into_iter().enumerate() {
            match self.upsert_movie(doc, source) {
                Ok(UpsertOutcome::Inserted) => report.inserted += 1,
                Ok(UpsertOutcome::Updated) => report.updated += 1,
                Err(CineQueryError::InvalidInput(reason)) => {
                    tracing::warn!("Skipping document {}: {}", index + 1, reason);
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit()?;
        tracing::info!(
            "Imported {} movies ({} new, {} replaced, {} skipped)",
            report.total(),
            report.inserted,
            report.updated,
            report.skipped
        );
        Ok(report)
    }

    /// Import movies from a `.json` or `.ndjson` file
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportReport> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        self.import_str(&content, Some(&path.display().to_string()))
    }

    /// Stored document by row key
    pub fn get_movie(&self, id: &str) -> Result<Option<Value>> {
        let text: Option<String> = self
            .conn
            .query_row("SELECT doc FROM movies WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        text.map(|t| serde_json::from_str(&t).map_err(CineQueryError::from))
            .transpose()
    }

    /// Number of stored movies
    pub fn count_movies(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Run a find over all movies in natural order
    pub fn find_movies(
        &self,
        filter: &Map<String, Value>,
        options: &FindOptions,
    ) -> std::result::Result<Vec<Value>, ExecutionError> {
        let compiled = CompiledFind::compile(filter, options)?;
        let mut stmt = self
            .conn
            .prepare_cached("SELECT doc FROM movies ORDER BY seq")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let docs = rows.map(|row| -> std::result::Result<Value, ExecutionError> {
            let text = row?;
            serde_json::from_str(&text).map_err(ExecutionError::Decode)
        });
        let found = compiled.run(docs, options);
        found
    }
}

fn parse_documents(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .map_err(|e| CineQueryError::Parse(format!("line {}: {}", n + 1, e)))
        })
        .collect()
}
