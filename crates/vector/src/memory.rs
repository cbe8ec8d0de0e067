use async_trait::async_trait;
use medsearch_common::{MedSearchError, Result};
use medsearch_embedding::Embedding;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::similarity::cosine_similarity;
use crate::store::{StoreConnector, VectorStore};
use crate::types::{ScoredMatch, VectorStoreEntry};

/// Vector store kept in process memory, scored by cosine similarity
///
/// Clones share the same entries.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, VectorStoreEntry>>>,
    dimension: usize,
}

impl InMemoryStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            dimension,
        }
    }

    /// Number of stored entries
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Stored entry by id
    pub async fn get(&self, id: &str) -> Option<VectorStoreEntry> {
        self.entries.read().await.get(id).cloned()
    }

    fn check_dimension(&self, len: usize) -> Result<()> {
        if len != self.dimension {
            return Err(MedSearchError::vector_store(format!(
                "vector dimension {} does not match index dimension {}",
                len, self.dimension
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn upsert(&self, entries: Vec<VectorStoreEntry>) -> Result<usize> {
        for entry in &entries {
            self.check_dimension(entry.values.len())?;
        }

        let count = entries.len();
        let mut stored = self.entries.write().await;
        for entry in entries {
            stored.insert(entry.id.clone(), entry);
        }

        debug!("Upserted {} entries ({} total)", count, stored.len());
        Ok(count)
    }

    async fn query(&self, vector: &Embedding, top_k: usize) -> Result<Vec<ScoredMatch>> {
        self.check_dimension(vector.len())?;

        let stored = self.entries.read().await;
        let mut results: Vec<ScoredMatch> = stored
            .values()
            .map(|entry| ScoredMatch {
                id: entry.id.clone(),
                score: f64::from(cosine_similarity(vector.as_slice(), &entry.values)),
                metadata: entry.metadata.clone(),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        results.truncate(top_k);

        Ok(results)
    }
}

#[async_trait]
impl StoreConnector for InMemoryStore {
    async fn connect(&self) -> Result<Arc<dyn VectorStore>> {
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;

    fn entry(id: &str, values: Vec<f32>) -> VectorStoreEntry {
        let mut metadata = Metadata::new();
        metadata.insert("id".to_string(), id.to_string());
        VectorStoreEntry {
            id: id.to_string(),
            values,
            metadata,
        }
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity() {
        let store = InMemoryStore::new(2);
        store
            .upsert(vec![
                entry("a", vec![1.0, 0.0]),
                entry("b", vec![0.7, 0.7]),
                entry("c", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let query = Embedding::new(vec![1.0, 0.1], 2).unwrap();
        let results = store.query(&query, 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[1].id, "b");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let store = InMemoryStore::new(2);
        store.upsert(vec![entry("a", vec![1.0, 0.0])]).await.unwrap();
        store.upsert(vec![entry("a", vec![0.0, 1.0])]).await.unwrap();

        assert_eq!(store.count().await, 1);
        assert_eq!(store.get("a").await.unwrap().values, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_an_error() {
        let store = InMemoryStore::new(3);
        assert!(store.upsert(vec![entry("a", vec![1.0, 0.0])]).await.is_err());

        let query = Embedding::new(vec![1.0, 0.0], 2).unwrap();
        assert!(store.query(&query, 5).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_store_returns_no_matches() {
        let store = InMemoryStore::new(2);
        let query = Embedding::new(vec![1.0, 0.0], 2).unwrap();
        assert!(store.query(&query, 5).await.unwrap().is_empty());
    }
}
