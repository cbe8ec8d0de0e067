//! Pinecone REST client.
//!
//! [`PineconeClient`] talks to the control plane (index provisioning and host
//! resolution), [`PineconeIndex`] to one index's data plane (upsert/query).

mod types;

pub use types::{IndexModel, IndexStatus};

use async_trait::async_trait;
use medsearch_common::{AppConfig, IndexSpec, MedSearchError, Result};
use medsearch_embedding::Embedding;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::store::{StoreConnector, VectorStore};
use crate::types::{ScoredMatch, VectorStoreEntry};
use types::{
    CreateIndexRequest, CreateIndexSpec, IndexList, QueryRequest, QueryResponse, ServerlessSpec,
    UpsertRequest, UpsertResponse,
};

const API_VERSION: &str = "2024-07";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| MedSearchError::store_connection(format!("Failed to create HTTP client: {}", e)))
}

fn with_auth(builder: RequestBuilder, api_key: &str) -> RequestBuilder {
    builder
        .header("Api-Key", api_key)
        .header("X-Pinecone-API-Version", API_VERSION)
}

/// Turn a non-2xx response into an error carrying the body
async fn check_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MedSearchError::vector_store(format!(
        "{} failed with {}: {}",
        context, status, body
    )))
}

/// Data-plane hosts come back without a scheme
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

/// Pinecone control-plane client
#[derive(Debug, Clone)]
pub struct PineconeClient {
    control_url: String,
    api_key: String,
    client: Client,
    ready_poll_interval: Duration,
    ready_poll_attempts: u32,
}

impl PineconeClient {
    /// Create new control-plane client
    pub fn new(control_url: &str, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            control_url: control_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: build_http_client()?,
            ready_poll_interval: Duration::from_secs(2),
            ready_poll_attempts: 60,
        })
    }

    /// Create client from application config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.pinecone_control_url, config.pinecone_api_key.clone())
    }

    /// Override how long [`PineconeClient::ensure_index`] waits for a new index
    pub fn with_ready_polling(mut self, interval: Duration, attempts: u32) -> Self {
        self.ready_poll_interval = interval;
        self.ready_poll_attempts = attempts;
        self
    }

    /// Describe an index, `None` when it does not exist
    pub async fn describe_index(&self, name: &str) -> Result<Option<IndexModel>> {
        let url = format!("{}/indexes/{}", self.control_url, name);
        let response = with_auth(self.client.get(&url), &self.api_key)
            .send()
            .await
            .map_err(|e| MedSearchError::store_connection(format!("Failed to reach Pinecone: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response, "describe index").await?;
        let model: IndexModel = response
            .json()
            .await
            .map_err(|e| MedSearchError::vector_store(format!("Failed to parse index description: {}", e)))?;

        Ok(Some(model))
    }

    /// Names and settings of every index in the project
    pub async fn list_indexes(&self) -> Result<Vec<IndexModel>> {
        let url = format!("{}/indexes", self.control_url);
        let response = with_auth(self.client.get(&url), &self.api_key)
            .send()
            .await
            .map_err(|e| MedSearchError::store_connection(format!("Failed to reach Pinecone: {}", e)))?;

        let list: IndexList = check_status(response, "list indexes")
            .await?
            .json()
            .await
            .map_err(|e| MedSearchError::vector_store(format!("Failed to parse index list: {}", e)))?;

        Ok(list.indexes)
    }

    /// Create a serverless index
    pub async fn create_index(&self, spec: &IndexSpec) -> Result<IndexModel> {
        info!(
            "Creating index '{}' (dimension={}, metric={}, {}/{})",
            spec.name, spec.dimension, spec.metric, spec.cloud, spec.region
        );

        let url = format!("{}/indexes", self.control_url);
        let request = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: &spec.metric,
            spec: CreateIndexSpec {
                serverless: ServerlessSpec {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
        };

        let response = with_auth(self.client.post(&url), &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MedSearchError::store_connection(format!("Failed to reach Pinecone: {}", e)))?;

        check_status(response, "create index")
            .await?
            .json()
            .await
            .map_err(|e| MedSearchError::vector_store(format!("Failed to parse created index: {}", e)))
    }

    /// Make sure the index exists with the expected dimension
    ///
    /// Creates it when missing and waits until it is ready. An existing index
    /// with another dimension is a configuration error.
    pub async fn ensure_index(&self, spec: &IndexSpec) -> Result<IndexModel> {
        if let Some(existing) = self.describe_index(&spec.name).await? {
            debug!("Index '{}' already exists", spec.name);

            if let Some(dimension) = existing.dimension {
                if dimension != spec.dimension {
                    return Err(MedSearchError::config(format!(
                        "Index '{}' has dimension {}, embeddings have {}",
                        spec.name, dimension, spec.dimension
                    )));
                }
            }
            if !existing.metric.is_empty() && existing.metric != spec.metric {
                warn!(
                    "Index '{}' uses metric '{}' instead of '{}'",
                    spec.name, existing.metric, spec.metric
                );
            }
            return Ok(existing);
        }

        let created = self.create_index(spec).await?;
        if created.status.ready {
            return Ok(created);
        }
        self.wait_until_ready(&spec.name).await
    }

    async fn wait_until_ready(&self, name: &str) -> Result<IndexModel> {
        for attempt in 1..=self.ready_poll_attempts {
            tokio::time::sleep(self.ready_poll_interval).await;

            match self.describe_index(name).await? {
                Some(model) if model.status.ready => {
                    info!("Index '{}' is ready", name);
                    return Ok(model);
                }
                Some(model) => debug!(
                    "Index '{}' not ready yet (state={}, check {}/{})",
                    name, model.status.state, attempt, self.ready_poll_attempts
                ),
                None => debug!("Index '{}' not visible yet", name),
            }
        }

        Err(MedSearchError::vector_store(format!(
            "Index '{}' did not become ready",
            name
        )))
    }

    /// Resolve an index's host and open its data plane
    pub async fn connect_index(&self, name: &str) -> Result<PineconeIndex> {
        let model = self
            .describe_index(name)
            .await
            .map_err(|e| MedSearchError::store_connection(e.to_string()))?
            .ok_or_else(|| MedSearchError::store_connection(format!("Index '{}' not found", name)))?;

        if model.host.is_empty() {
            return Err(MedSearchError::store_connection(format!(
                "Index '{}' has no host yet",
                name
            )));
        }

        PineconeIndex::new(&model.host, self.api_key.clone())
    }
}

/// Data plane of one Pinecone index
#[derive(Debug, Clone)]
pub struct PineconeIndex {
    host: String,
    api_key: String,
    client: Client,
}

impl PineconeIndex {
    pub fn new(host: &str, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            host: normalize_host(host),
            api_key: api_key.into(),
            client: build_http_client()?,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl VectorStore for PineconeIndex {
    async fn upsert(&self, entries: Vec<VectorStoreEntry>) -> Result<usize> {
        let url = format!("{}/vectors/upsert", self.host);
        debug!("Upserting {} vectors to {}", entries.len(), self.host);

        let response = with_auth(self.client.post(&url), &self.api_key)
            .json(&UpsertRequest { vectors: &entries })
            .send()
            .await
            .map_err(|e| MedSearchError::vector_store(format!("Upsert request failed: {}", e)))?;

        let result: UpsertResponse = check_status(response, "upsert")
            .await?
            .json()
            .await
            .map_err(|e| MedSearchError::vector_store(format!("Failed to parse upsert response: {}", e)))?;

        Ok(result.upserted_count)
    }

    async fn query(&self, vector: &Embedding, top_k: usize) -> Result<Vec<ScoredMatch>> {
        let url = format!("{}/query", self.host);
        let request = QueryRequest {
            vector: vector.as_slice(),
            top_k,
            include_metadata: true,
            include_values: false,
        };

        let response = with_auth(self.client.post(&url), &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MedSearchError::vector_store(format!("Query request failed: {}", e)))?;

        let result: QueryResponse = check_status(response, "query")
            .await?
            .json()
            .await
            .map_err(|e| MedSearchError::vector_store(format!("Failed to parse query response: {}", e)))?;

        let mut matches: Vec<ScoredMatch> =
            result.matches.into_iter().map(|m| m.into_scored()).collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!("Query returned {} matches", matches.len());
        Ok(matches)
    }
}

/// Opens a fresh [`PineconeIndex`] on every call
///
/// Serverless connections time out between requests, so nothing is reused.
#[derive(Debug, Clone)]
pub struct PineconeConnector {
    control_url: String,
    api_key: String,
    index_name: String,
    index_host: Option<String>,
}

impl PineconeConnector {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            control_url: config.pinecone_control_url.clone(),
            api_key: config.pinecone_api_key.clone(),
            index_name: config.index.name.clone(),
            index_host: config.pinecone_index_host.clone(),
        }
    }
}

#[async_trait]
impl StoreConnector for PineconeConnector {
    async fn connect(&self) -> Result<Arc<dyn VectorStore>> {
        let index = match &self.index_host {
            Some(host) => PineconeIndex::new(host, self.api_key.clone())?,
            None => {
                PineconeClient::new(&self.control_url, self.api_key.clone())?
                    .connect_index(&self.index_name)
                    .await?
            }
        };
        Ok(Arc::new(index))
    }
}
