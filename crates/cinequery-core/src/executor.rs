//! Query execution against the movie store

use crate::error::{CineQueryError, ExecutionError, Result};
use crate::movie::MovieDocument;
use crate::query::StructuredQuery;
use crate::store::{DocumentStore, FindOptions};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Result cap of the lexical fallback search
pub const SEARCH_LIMIT: usize = 10;

/// Fields the lexical search looks at
pub const SEARCH_FIELDS: &[&str] = &["title", "plot", "directors", "cast"];

/// Validates structured queries and runs them on a [`DocumentStore`]
#[derive(Clone)]
pub struct QueryExecutor {
    store: Arc<dyn DocumentStore>,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Validate and run a query.
    ///
    /// Validation happens before the store is touched. An empty result is
    /// a valid outcome.
    pub async fn execute(&self, query: &StructuredQuery) -> Result<Vec<MovieDocument>> {
        let spec = query.validate()?;
        tracing::info!("Executing query on {}: {}", self.store.name(), query);

        let docs = self.store.find(&spec.filter, &spec.options).await?;
        tracing::info!("Query returned {} results", docs.len());

        if docs.is_empty() {
            self.check_empty_collection().await;
        }

        decode_all(docs)
    }

    /// Case-insensitive substring search over title, plot, directors and
    /// cast, capped at [`SEARCH_LIMIT`] results in natural order
    pub async fn search(&self, term: &str) -> Result<Vec<MovieDocument>> {
        let filter = search_filter(term);
        let docs = self
            .store
            .find(&filter, &FindOptions::with_limit(SEARCH_LIMIT))
            .await?;
        tracing::info!("Search for {:?} returned {} results", term, docs.len());
        decode_all(docs)
    }

    /// Fetch one movie by `_id`, accepting both plain and `$oid` ids
    pub async fn get_movie(&self, id: &str) -> Result<MovieDocument> {
        let filter = json!({"$or": [{"_id": id}, {"_id": {"$oid": id}}]});
        let filter = filter.as_object().cloned().unwrap_or_default();
        match self.store.find_one(&filter).await? {
            Some(doc) => decode(doc),
            None => Err(CineQueryError::MovieNotFound(id.to_string())),
        }
    }

    /// Diagnostic only: log when the collection itself is empty
    async fn check_empty_collection(&self) {
        match self.store.count_documents().await {
            Ok(0) => tracing::warn!(
                "No documents found in {} store; the catalog might not be imported",
                self.store.name()
            ),
            Ok(_) => {}
            Err(e) => tracing::warn!("Store count failed: {}", e),
        }
    }
}

/// `$or` of escaped, case-insensitive regexes over [`SEARCH_FIELDS`]
pub fn search_filter(term: &str) -> Map<String, Value> {
    let pattern = regex::escape(term);
    let clauses: Vec<Value> = SEARCH_FIELDS
        .iter()
        .map(|field| {
            let mut clause = Map::new();
            clause.insert(
                field.to_string(),
                json!({"$regex": pattern, "$options": "i"}),
            );
            Value::Object(clause)
        })
        .collect();
    let mut filter = Map::new();
    filter.insert("$or".to_string(), Value::Array(clauses));
    filter
}

fn decode(doc: Value) -> Result<MovieDocument> {
    MovieDocument::from_value(doc)
        .map_err(|e| CineQueryError::Execution(ExecutionError::Decode(e)))
}

fn decode_all(docs: Vec<Value>) -> Result<Vec<MovieDocument>> {
    docs.into_iter().map(decode).collect()
}
