use serde::{Deserialize, Serialize};

/// Why an embedding could not be produced
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmbeddingFailure {
    /// Request exceeded the configured timeout
    #[error("embedding request timed out")]
    Timeout,

    /// Endpoint answered with a non-2xx status
    #[error("embedding endpoint returned HTTP {0}")]
    Status(u16),

    /// Request never got an answer (DNS, connect, TLS...)
    #[error("embedding request failed: {0}")]
    Transport(String),

    /// Response body could not be read as a vector
    #[error("malformed embedding response: {0}")]
    Malformed(String),

    /// Vector length differs from the index dimension
    #[error("embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// In-process model failed
    #[error("embedding model error: {0}")]
    Model(String),
}

/// Fixed-length embedding vector
///
/// Can only be built with the expected number of finite values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Wrap `values`, rejecting any length other than `expected_dim`
    pub fn new(values: Vec<f32>, expected_dim: usize) -> Result<Self, EmbeddingFailure> {
        if values.len() != expected_dim {
            return Err(EmbeddingFailure::DimensionMismatch {
                expected: expected_dim,
                actual: values.len(),
            });
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(EmbeddingFailure::Malformed(
                "embedding contains non-finite values".to_string(),
            ));
        }

        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

/// Feature-extraction request body
#[derive(Debug, Clone, Serialize)]
pub struct FeatureExtractionRequest {
    /// Text to embed
    pub inputs: String,

    /// Inference options
    pub options: FeatureExtractionOptions,
}

/// Feature-extraction options
#[derive(Debug, Clone, Serialize)]
pub struct FeatureExtractionOptions {
    /// Block until the model is loaded instead of answering 503
    pub wait_for_model: bool,
}

impl FeatureExtractionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            inputs: text.into(),
            options: FeatureExtractionOptions {
                wait_for_model: true,
            },
        }
    }
}

/// Feature-extraction response
///
/// The endpoint answers either with a bare vector or with a single vector
/// wrapped in a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeatureExtractionResponse {
    Flat(Vec<f32>),
    Nested(Vec<Vec<f32>>),
}

impl FeatureExtractionResponse {
    /// Flatten to one vector
    pub fn into_vector(self) -> Result<Vec<f32>, EmbeddingFailure> {
        match self {
            Self::Flat(values) => Ok(values),
            Self::Nested(mut rows) if rows.len() == 1 => Ok(rows.pop().unwrap_or_default()),
            Self::Nested(rows) => Err(EmbeddingFailure::Malformed(format!(
                "expected a single vector, got {} rows",
                rows.len()
            ))),
        }
    }
}
