//! Fakes shared by route tests

use async_trait::async_trait;
use medsearch_common::{AppConfig, MedSearchError, Result};
use medsearch_embedding::{Embedder, Embedding, EmbeddingFailure, QueryPhrasing};
use medsearch_vector::{
    InMemoryStore, Metadata, Retriever, StoreConnector, VectorStore, VectorStoreEntry,
};
use std::sync::Arc;

use crate::state::AppState;

/// Bag-of-bytes embedder, or one that always fails
pub struct FakeEmbedder {
    fail: bool,
}

impl FakeEmbedder {
    pub const DIM: usize = 8;

    pub fn ok() -> Arc<Self> {
        Arc::new(Self { fail: false })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true })
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> std::result::Result<Embedding, EmbeddingFailure> {
        if self.fail {
            return Err(EmbeddingFailure::Timeout);
        }
        let mut values = vec![0.0f32; Self::DIM];
        for (i, b) in text.to_lowercase().bytes().enumerate() {
            values[(b as usize + i) % Self::DIM] += 1.0;
        }
        Embedding::new(values, Self::DIM)
    }

    fn dimension(&self) -> usize {
        Self::DIM
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

struct Connector {
    store: InMemoryStore,
    refuse: bool,
}

#[async_trait]
impl StoreConnector for Connector {
    async fn connect(&self) -> Result<Arc<dyn VectorStore>> {
        if self.refuse {
            return Err(MedSearchError::store_connection("index unreachable"));
        }
        Ok(Arc::new(self.store.clone()))
    }
}

/// App state over an in-memory store with default config
pub fn state_with(embedder: Arc<FakeEmbedder>, store: InMemoryStore, refuse: bool) -> AppState {
    let retriever = Retriever::new(embedder, Arc::new(Connector { store, refuse }))
        .with_phrasing(QueryPhrasing::Web);
    AppState::with_retriever(AppConfig::default(), retriever)
}

/// Store one medicine embedded from its lookup phrasing
pub async fn seed(store: &InMemoryStore, id: &str, name: &str, extra: &[(&str, &str)]) {
    let mut metadata = Metadata::new();
    metadata.insert("id".to_string(), id.to_string());
    metadata.insert("name".to_string(), name.to_string());
    for (k, v) in extra {
        metadata.insert(k.to_string(), v.to_string());
    }

    let values = FakeEmbedder { fail: false }
        .embed(&QueryPhrasing::Web.phrase(name))
        .await
        .unwrap()
        .into_inner();
    store
        .upsert(vec![VectorStoreEntry {
            id: id.to_string(),
            values,
            metadata,
        }])
        .await
        .unwrap();
}
