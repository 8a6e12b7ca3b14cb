use super::{DocumentStore, FindOptions};
use crate::error::ExecutionError;
use crate::query;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;

/// In-memory document collection
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(docs: Vec<Value>) -> Self {
        Self {
            docs: Arc::new(RwLock::new(docs)),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        filter: &Map<String, Value>,
        options: &FindOptions,
    ) -> Result<Vec<Value>, ExecutionError> {
        let compiled = query::CompiledFind::compile(filter, options)?;
        let docs = self.docs.read();
        compiled.run(docs.iter().cloned().map(Ok), options)
    }

    async fn count_documents(&self) -> Result<usize, ExecutionError> {
        Ok(self.len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_find_and_find_one() {
        let store = MemoryStore::with_documents(vec![
            json!({"_id": "a", "year": 1999}),
            json!({"_id": "b", "year": 2004}),
        ]);
        let filter = json!({"year": {"$gt": 2000}}).as_object().unwrap().clone();

        let docs = store.find(&filter, &FindOptions::default()).await.unwrap();
        assert_eq!(docs, vec![json!({"_id": "b", "year": 2004})]);

        let one = store.find_one(&Map::new()).await.unwrap();
        assert_eq!(one.unwrap()["_id"], "a");
        assert_eq!(store.count_documents().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.find_one(&Map::new()).await.unwrap().is_none());
        assert_eq!(store.count_documents().await.unwrap(), 0);
    }
}
