//! [`DocumentStore`] over the SQLite catalog

use super::{Database, DatabaseStats, ImportReport};
use crate::error::{CineQueryError, ExecutionError, Result};
use crate::store::{DocumentStore, FindOptions};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle to the catalog database.
///
/// SQLite work runs on the blocking pool so the async runtime is never
/// stalled by a table scan.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open and initialize the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::open(path)?;
        db.initialize()?;
        Ok(Self::new(db))
    }

    async fn with_db<T, F>(&self, f: F) -> std::result::Result<T, ExecutionError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> std::result::Result<T, ExecutionError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db.lock()))
            .await
            .map_err(|e| ExecutionError::Task(format!("store task failed: {e}")))?
    }

    /// Catalog statistics
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || db.lock().get_stats())
            .await
            .map_err(|e| CineQueryError::Other(anyhow::anyhow!("stats task failed: {e}")))?
    }

    /// Import a JSON or NDJSON file into the catalog
    pub async fn import_file(&self, path: PathBuf) -> Result<ImportReport> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || db.lock().import_file(&path))
            .await
            .map_err(|e| CineQueryError::Other(anyhow::anyhow!("import task failed: {e}")))?
    }

    /// Stored document by row key
    pub async fn get(&self, id: String) -> Result<Option<Value>> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || db.lock().get_movie(&id))
            .await
            .map_err(|e| CineQueryError::Other(anyhow::anyhow!("lookup task failed: {e}")))?
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find(
        &self,
        filter: &Map<String, Value>,
        options: &FindOptions,
    ) -> std::result::Result<Vec<Value>, ExecutionError> {
        let filter = filter.clone();
        let options = options.clone();
        self.with_db(move |db| db.find_movies(&filter, &options))
            .await
    }

    async fn count_documents(&self) -> std::result::Result<usize, ExecutionError> {
        self.with_db(|db| {
            db.count_movies().map_err(|e| match e {
                CineQueryError::Database(e) => ExecutionError::Store(e),
                other => ExecutionError::Task(other.to_string()),
            })
        })
        .await
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
