use async_trait::async_trait;
use medsearch_common::{AppConfig, EmbeddingBackend, Result};
use std::sync::Arc;
use tracing::info;

use crate::remote::RemoteEmbedder;
use crate::types::{Embedding, EmbeddingFailure};

/// Common trait for embedding strategies
///
/// Implementations are built once at startup and shared read-only.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text` into exactly [`Embedder::dimension`] floats
    ///
    /// Empty text is handed to the model unchanged.
    async fn embed(&self, text: &str) -> std::result::Result<Embedding, EmbeddingFailure>;

    /// Output vector length
    fn dimension(&self) -> usize;

    /// Model identifier, for logs and health reporting
    fn model_name(&self) -> &str;
}

/// Build the embedder selected by `config.embedding_backend`
///
/// Loading the local model happens here, so a broken model fails startup
/// rather than the first request.
pub fn build_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.embedding_backend {
        EmbeddingBackend::Remote => Arc::new(RemoteEmbedder::from_config(config)?),
        EmbeddingBackend::Local => load_local()?,
    };

    info!(
        "Embedder ready: backend={}, model={}, dimension={}",
        config.embedding_backend,
        embedder.model_name(),
        embedder.dimension()
    );

    Ok(embedder)
}

#[cfg(feature = "local-model")]
fn load_local() -> Result<Arc<dyn Embedder>> {
    Ok(Arc::new(crate::local::LocalEmbedder::load()?))
}

#[cfg(not(feature = "local-model"))]
fn load_local() -> Result<Arc<dyn Embedder>> {
    Err(medsearch_common::MedSearchError::config(
        "EMBEDDING_BACKEND=local requires building with the `local-model` feature",
    ))
}
