//! Translate-then-execute pipeline
//!
//! [`MoviePipeline`] is what the CLI, MCP and HTTP boundaries hold. It owns
//! the translator and the executor; the store session is constructed by the
//! caller once at startup and passed in.

use crate::config::Config;
use crate::db::SqliteStore;
use crate::error::{CineQueryError, Result};
use crate::executor::QueryExecutor;
use crate::llm::QueryTranslator;
use crate::movie::MovieDocument;
use crate::query::StructuredQuery;
use crate::store::DocumentStore;
use serde::Serialize;
use std::sync::Arc;

/// A user message accepted for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest(String);

impl TranslationRequest {
    /// Blank messages are rejected before any completion call
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CineQueryError::InvalidInput(
                "message is required and must be a non-empty string".to_string(),
            ));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Generated query together with its results
#[derive(Debug, Clone, Serialize)]
pub struct ChatAnswer {
    pub query: StructuredQuery,
    pub result: Vec<MovieDocument>,
}

impl ChatAnswer {
    /// Query as compact JSON text
    pub fn query_text(&self) -> String {
        self.query.to_json_string()
    }
}

pub struct MoviePipeline {
    translator: QueryTranslator,
    executor: QueryExecutor,
}

impl MoviePipeline {
    pub fn new(translator: QueryTranslator, executor: QueryExecutor) -> Self {
        Self {
            translator,
            executor,
        }
    }

    /// Build from configuration: SQLite catalog at `database.path` and the
    /// configured completion service
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = SqliteStore::open(&config.database.path)?;
        tracing::info!("Opened catalog at {}", config.database.path.display());
        Self::with_store(config, Arc::new(store))
    }

    /// Build from configuration around an existing store
    pub fn with_store(config: &Config, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let translator = QueryTranslator::from_config(config.llm_service.clone())?;
        Ok(Self::new(translator, QueryExecutor::new(store)))
    }

    /// Translate a message and run the resulting query.
    ///
    /// A translation failure short-circuits: the store is not queried.
    pub async fn translate_and_execute(&self, request: &TranslationRequest) -> Result<ChatAnswer> {
        tracing::info!("Processing chat message: {}", request.as_str());
        let query = self.translator.translate(request.as_str()).await?;
        let result = self.executor.execute(&query).await?;
        Ok(ChatAnswer { query, result })
    }

    pub async fn translate(&self, request: &TranslationRequest) -> Result<StructuredQuery> {
        Ok(self.translator.translate(request.as_str()).await?)
    }

    pub async fn execute(&self, query: &StructuredQuery) -> Result<Vec<MovieDocument>> {
        self.executor.execute(query).await
    }

    pub async fn search(&self, term: &str) -> Result<Vec<MovieDocument>> {
        self.executor.search(term).await
    }

    pub async fn get_movie(&self, id: &str) -> Result<MovieDocument> {
        self.executor.get_movie(id).await
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    pub fn translator(&self) -> &QueryTranslator {
        &self.translator
    }
}
