use medsearch_common::MedSearchError;
use medsearch_embedding::{Embedder, EmbeddingFailure, QueryPhrasing};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::normalize::{ProbeBounds, ResponseRecord};
use crate::store::StoreConnector;

/// Candidates requested from the store; only the best one is used
pub const SEARCH_TOP_K: usize = 5;

/// Result of a lookup that reached the store
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(ResponseRecord),
    NotFound,
}

/// Why a lookup failed
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Blank query; nothing was embedded or queried
    #[error("Medicine name is required")]
    MissingQuery,

    /// Query text could not be embedded; the store was not contacted
    #[error("Failed to generate embedding: {0}")]
    Embedding(#[from] EmbeddingFailure),

    /// Store handle could not be acquired
    #[error("Failed to connect to vector store: {0}")]
    StoreConnection(#[source] MedSearchError),

    /// Store query failed
    #[error("Vector store query failed: {0}")]
    Store(#[source] MedSearchError),
}

/// Query path: embed, fetch nearest neighbours, normalize the top match
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    connector: Arc<dyn StoreConnector>,
    phrasing: QueryPhrasing,
    bounds: ProbeBounds,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            embedder,
            connector,
            phrasing: QueryPhrasing::default(),
            bounds: ProbeBounds::DEFAULT,
            top_k: SEARCH_TOP_K,
        }
    }

    pub fn with_phrasing(mut self, phrasing: QueryPhrasing) -> Self {
        self.phrasing = phrasing;
        self
    }

    pub fn with_bounds(mut self, bounds: ProbeBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Look up the medicine closest to `query`
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        let name = query.trim();
        if name.is_empty() {
            return Err(SearchError::MissingQuery);
        }

        let text = self.phrasing.phrase(name);
        let embedding = self.embedder.embed(&text).await.map_err(|e| {
            warn!("Embedding failed for '{}': {}", name, e);
            SearchError::from(e)
        })?;

        let store = self
            .connector
            .connect()
            .await
            .map_err(SearchError::StoreConnection)?;

        let matches = store
            .query(&embedding, self.top_k)
            .await
            .map_err(SearchError::Store)?;
        debug!("'{}' matched {} candidates", name, matches.len());

        let Some(top) = matches.first() else {
            info!("No match for '{}'", name);
            return Ok(SearchOutcome::NotFound);
        };

        let record = ResponseRecord::from_match(top, name, &self.bounds);
        info!("'{}' → '{}' (score {})", name, record.name, record.match_score);
        Ok(SearchOutcome::Found(record))
    }
}
