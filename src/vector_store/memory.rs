//! In-memory vector store implementation.
//!
//! Useful for testing and for sessions that do not need to persist the index.

use super::{rank, Document, SearchResult, VectorStore};
use crate::error::{CoursebotError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// In-memory vector store.
pub struct MemoryVectorStore {
    collections: RwLock<Collections>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|e| CoursebotError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|e| CoursebotError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, collection: &str, docs: &[Document]) -> Result<usize> {
        let mut collections = self.write()?;
        let store = collections.entry(collection.to_string()).or_default();
        for doc in docs {
            store.insert(doc.id.clone(), doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.read()?;
        let docs = collections
            .get(collection)
            .map(|store| store.values().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(rank(docs, query_embedding, limit))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.read()?.get(collection).map_or(0, BTreeMap::len))
    }

    async fn clear(&self, collection: &str) -> Result<usize> {
        Ok(self.write()?.remove(collection).map_or(0, |store| store.len()))
    }
}
