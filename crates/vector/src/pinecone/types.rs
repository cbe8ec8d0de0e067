use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::{Metadata, ScoredMatch, VectorStoreEntry};

/// `POST /vectors/upsert` body
#[derive(Debug, Serialize)]
pub struct UpsertRequest<'a> {
    pub vectors: &'a [VectorStoreEntry],
}

/// `POST /vectors/upsert` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    #[serde(default)]
    pub upserted_count: usize,
}

/// `POST /query` body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<'a> {
    pub vector: &'a [f32],
    pub top_k: usize,
    pub include_metadata: bool,
    pub include_values: bool,
}

/// `POST /query` response
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<QueryMatch>,
}

/// Single query hit as sent by the service
#[derive(Debug, Deserialize)]
pub struct QueryMatch {
    pub id: String,

    #[serde(default)]
    pub score: f64,

    #[serde(default)]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl QueryMatch {
    /// Metadata values are coerced to strings; nulls are dropped
    pub fn into_scored(self) -> ScoredMatch {
        let metadata: Metadata = self
            .metadata
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();

        ScoredMatch {
            id: self.id,
            score: self.score,
            metadata,
        }
    }
}

/// Index description from the control plane
#[derive(Debug, Clone, Deserialize)]
pub struct IndexModel {
    pub name: String,

    #[serde(default)]
    pub dimension: Option<usize>,

    #[serde(default)]
    pub metric: String,

    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,

    #[serde(default)]
    pub state: String,
}

/// `GET /indexes` response
#[derive(Debug, Deserialize)]
pub struct IndexList {
    #[serde(default)]
    pub indexes: Vec<IndexModel>,
}

/// `POST /indexes` body
#[derive(Debug, Serialize)]
pub struct CreateIndexRequest<'a> {
    pub name: &'a str,
    pub dimension: usize,
    pub metric: &'a str,
    pub spec: CreateIndexSpec<'a>,
}

#[derive(Debug, Serialize)]
pub struct CreateIndexSpec<'a> {
    pub serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
pub struct ServerlessSpec<'a> {
    pub cloud: &'a str,
    pub region: &'a str,
}
