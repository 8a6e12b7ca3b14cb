//! Error types for cinequery
//!
//! The query pipeline has three failure classes, one per stage:
//! [`TranslationError`] (completion service), [`ValidationError`]
//! (structured query shape) and [`ExecutionError`] (document store).
//! [`CineQueryError`] wraps them together with the ambient failures of
//! configuration, IO and the database layer.

use thiserror::Error;

/// Result type alias using CineQueryError
pub type Result<T> = std::result::Result<T, CineQueryError>;

/// Error type alias for convenience
pub type Error = CineQueryError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Failure to turn user text into a structured query.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("empty completion")]
    EmptyCompletion,

    #[error("malformed json: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("malformed json: expected an object, got {0}")]
    NotAnObject(&'static str),

    #[error("completion service error (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("completion request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("completion request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unreadable completion response: {0}")]
    Response(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else if err.is_decode() {
            Self::Response(err)
        } else {
            Self::Transport(err)
        }
    }
}

/// A structured query that does not have the allowed shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query must be a JSON object")]
    NotAnObject,

    #[error("filter is required and must be an object")]
    MissingFilter,

    #[error("filter must be an object, got {0}")]
    FilterNotObject(&'static str),

    #[error("{field} must be {expected}, got {found}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
}

/// Failure while running a validated query against the document store.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("invalid filter: {0}")]
    Filter(String),

    #[error("invalid projection: {0}")]
    Projection(String),

    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("stored document is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("store task failed: {0}")]
    Task(String),
}

/// Main error type for cinequery
#[derive(Debug, Error)]
pub enum CineQueryError {
    #[error("Failed to generate query: {0}")]
    Translation(#[from] TranslationError),

    #[error("Invalid query: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to execute query: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Movie not found: {0}")]
    MovieNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CineQueryError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MovieNotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Validation(_) | Self::Config(_) | Self::Parse(_) => {
                exit_codes::INVALID_INPUT
            }
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Whether the failure was caused by the caller's input rather than a
    /// collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
