//! Database layer for cinequery
//!
//! The movie catalog lives in a single SQLite table holding each document
//! as JSON text, in import order. Queries scan the table and evaluate
//! filters in Rust (see [`crate::query`]).

mod movies;
mod schema;
mod stats;
mod store;

pub use movies::{movie_key, ImportReport, UpsertOutcome};
pub use schema::Database;
pub use stats::DatabaseStats;
pub use store::SqliteStore;
use std::path::PathBuf;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("catalog.sqlite")
    }
}
