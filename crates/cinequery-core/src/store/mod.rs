//! Document store abstraction
//!
//! The executor only sees a [`DocumentStore`]: something that can run a
//! find over a collection of JSON documents. The SQLite catalog in
//! [`crate::db`] is the production implementation; [`MemoryStore`] backs
//! tests and small embedded catalogs.

mod memory;

pub use memory::MemoryStore;

use crate::error::ExecutionError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Sort direction for one sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Accepts `1`/`-1` and the strings `asc`, `desc`, `ascending`,
    /// `descending`
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "asc" | "ascending" => Some(Self::Ascending),
                "desc" | "descending" => Some(Self::Descending),
                _ => None,
            },
            other => match crate::query::value::as_number(other) {
                Some(n) if n == 1.0 => Some(Self::Ascending),
                Some(n) if n == -1.0 => Some(Self::Descending),
                _ => None,
            },
        }
    }
}

/// Options of a find
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub projection: Option<Map<String, Value>>,
    /// Sort keys in precedence order
    pub sort: Vec<(String, SortDirection)>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

impl FindOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }
}

/// Read access to a collection of movie documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a find; results follow `options.sort` or natural order
    async fn find(
        &self,
        filter: &Map<String, Value>,
        options: &FindOptions,
    ) -> Result<Vec<Value>, ExecutionError>;

    /// First match of `filter`, if any
    async fn find_one(&self, filter: &Map<String, Value>) -> Result<Option<Value>, ExecutionError> {
        let mut docs = self.find(filter, &FindOptions::with_limit(1)).await?;
        Ok(docs.pop())
    }

    /// Total number of documents in the collection
    async fn count_documents(&self) -> Result<usize, ExecutionError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_direction_values() {
        assert_eq!(SortDirection::from_value(&json!(1)), Some(SortDirection::Ascending));
        assert_eq!(SortDirection::from_value(&json!(-1.0)), Some(SortDirection::Descending));
        assert_eq!(SortDirection::from_value(&json!("DESC")), Some(SortDirection::Descending));
        assert_eq!(SortDirection::from_value(&json!(0)), None);
        assert_eq!(SortDirection::from_value(&json!(true)), None);
    }
}
