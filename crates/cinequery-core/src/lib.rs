//! Cinequery Core Library
//!
//! Natural language questions about a movie catalog, answered by
//! translating them into structured document queries.
//!
//! # Features
//! - Query translation through an OpenAI-compatible completion service
//! - A document query language (filter, projection, sort, skip, limit)
//!   evaluated over JSON movie documents
//! - SQLite-backed catalog with JSON/NDJSON import
//! - Lexical fallback search over title, plot, directors and cast

pub mod config;
pub mod db;
pub mod error;
pub mod executor;
pub mod llm;
pub mod movie;
pub mod pipeline;
pub mod query;
pub mod store;

pub use config::{Config, DatabaseConfig, LLMServiceConfig, ServerConfig};
pub use db::{Database, DatabaseStats, ImportReport, SqliteStore};
pub use error::{
    CineQueryError, Error, ExecutionError, Result, TranslationError, ValidationError,
};
pub use executor::{QueryExecutor, SEARCH_LIMIT};
pub use llm::{
    ChatMessage, CompletionClient, CompletionOptions, HttpCompletionClient, MetricsSnapshot,
    QueryTranslator,
};
pub use movie::{MovieDocument, MovieFields, MovieId};
pub use pipeline::{ChatAnswer, MoviePipeline, TranslationRequest};
pub use query::{QuerySpec, StructuredQuery};
pub use store::{DocumentStore, FindOptions, MemoryStore, SortDirection};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "cinequery";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "cinequery";
