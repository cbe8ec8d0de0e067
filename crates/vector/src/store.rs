use async_trait::async_trait;
use medsearch_common::Result;
use medsearch_embedding::Embedding;
use std::sync::Arc;

use crate::types::{ScoredMatch, VectorStoreEntry};

/// Nearest-neighbour store holding medicine vectors
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite entries by id, returning how many were written
    async fn upsert(&self, entries: Vec<VectorStoreEntry>) -> Result<usize>;

    /// Up to `top_k` closest entries with metadata, best first
    async fn query(&self, vector: &Embedding, top_k: usize) -> Result<Vec<ScoredMatch>>;
}

/// Hands out a store handle
///
/// The query path calls [`StoreConnector::connect`] once per request and drops
/// the handle afterwards; nothing is pooled across requests.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn VectorStore>>;
}
