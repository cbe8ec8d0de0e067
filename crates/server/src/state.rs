use medsearch_common::{AppConfig, Result};
use medsearch_embedding::{build_embedder, QueryPhrasing};
use medsearch_vector::{PineconeConnector, Retriever};
use std::sync::Arc;

/// Shared application state
///
/// Read-only after startup. The embedder inside the retriever is the only
/// long-lived resource; store handles are opened per request.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Lookup pipeline
    pub retriever: Retriever,
}

impl AppState {
    /// Create new application state, loading the embedder
    pub fn new(config: AppConfig) -> Result<Self> {
        let embedder = build_embedder(&config)?;
        let connector = Arc::new(PineconeConnector::from_config(&config));
        let retriever = Retriever::new(embedder, connector).with_phrasing(QueryPhrasing::Web);

        Ok(Self::with_retriever(config, retriever))
    }

    pub fn with_retriever(config: AppConfig, retriever: Retriever) -> Self {
        Self { config, retriever }
    }
}
