use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use medsearch_common::{MedSearchError, Result, EMBEDDING_DIM};
use std::sync::Arc;
use tracing::{debug, info};

use crate::embedder::Embedder;
use crate::types::{Embedding, EmbeddingFailure};

const LOCAL_MODEL_NAME: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// In-process all-MiniLM-L6-v2 embedder
///
/// The model is loaded once and shared; inference runs on the blocking pool.
#[derive(Clone)]
pub struct LocalEmbedder {
    model: Arc<TextEmbedding>,
    dimension: usize,
}

impl LocalEmbedder {
    /// Load the model, downloading it to the fastembed cache on first use
    pub fn load() -> Result<Self> {
        info!("Loading local embedding model: {}", LOCAL_MODEL_NAME);

        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(true),
        )
        .map_err(|e| MedSearchError::embedding(format!("Failed to load {}: {}", LOCAL_MODEL_NAME, e)))?;

        info!("Local embedding model loaded");
        Ok(Self {
            model: Arc::new(model),
            dimension: EMBEDDING_DIM,
        })
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> std::result::Result<Embedding, EmbeddingFailure> {
        debug!("Embedding locally - Text length: {}", text.len());

        let model = Arc::clone(&self.model);
        let input = text.to_string();
        let mut vectors = tokio::task::spawn_blocking(move || model.embed(vec![input], None))
            .await
            .map_err(|e| EmbeddingFailure::Model(e.to_string()))?
            .map_err(|e| EmbeddingFailure::Model(e.to_string()))?;

        let values = vectors
            .pop()
            .ok_or_else(|| EmbeddingFailure::Malformed("model returned no vector".to_string()))?;

        Embedding::new(values, self.dimension)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        LOCAL_MODEL_NAME
    }
}
