use serde::{Deserialize, Serialize};

/// `POST /search` body
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Medicine to look up
    #[serde(default)]
    pub medicine_name: Option<String>,
}

/// Error body returned by every failing route
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// `GET /health` body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub embedding_model: String,
    pub index_name: String,
    pub dimension: usize,
}
