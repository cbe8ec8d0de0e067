use async_trait::async_trait;
use medsearch_common::{AppConfig, MedSearchError, Result, EMBEDDING_DIM};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::embedder::Embedder;
use crate::types::{Embedding, EmbeddingFailure, FeatureExtractionRequest, FeatureExtractionResponse};

/// Hosted feature-extraction client
///
/// One HTTP call per text, bounded by the client timeout. No retries: the
/// first failure is returned to the caller.
#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    endpoint: String,
    token: String,
    model: String,
    dimension: usize,
    client: Client,
}

impl RemoteEmbedder {
    /// Create new feature-extraction client
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let model = model.into();
        let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), model);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MedSearchError::network(format!("Failed to create HTTP client: {}", e)))?;

        info!("Feature-extraction client initialized: {}", endpoint);
        Ok(Self {
            endpoint,
            token: token.into(),
            model,
            dimension: EMBEDDING_DIM,
            client,
        })
    }

    /// Create client from application config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let token = config.hf_api_token.clone().ok_or_else(|| {
            MedSearchError::config("HF_API_TOKEN is required for the remote embedding backend")
        })?;

        Self::new(
            &config.hf_api_url,
            config.embedding_model.clone(),
            token,
            config.embedding_timeout(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn transport_failure(err: reqwest::Error) -> EmbeddingFailure {
    if err.is_timeout() {
        EmbeddingFailure::Timeout
    } else {
        EmbeddingFailure::Transport(err.to_string())
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed(&self, text: &str) -> std::result::Result<Embedding, EmbeddingFailure> {
        debug!("Requesting embedding - Model: {}, Text length: {}", self.model, text.len());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&FeatureExtractionRequest::new(text))
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Feature-extraction endpoint returned {}: {}", status, body);
            return Err(EmbeddingFailure::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(transport_failure)?;
        let parsed: FeatureExtractionResponse = serde_json::from_str(&body)
            .map_err(|e| EmbeddingFailure::Malformed(e.to_string()))?;

        let embedding = Embedding::new(parsed.into_vector()?, self.dimension)?;
        debug!("Received embedding - Dimension: {}", embedding.len());
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
