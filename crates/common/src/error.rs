/// MedSearch error types
#[derive(Debug, thiserror::Error)]
pub enum MedSearchError {
    /// Embedding related error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store could not be reached or its client could not be built
    #[error("Vector store connection error: {0}")]
    StoreConnection(String),

    /// Vector store rejected or failed a request
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MedSearchError {
    /// Create embedding error
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create store connection error
    pub fn store_connection<S: Into<String>>(msg: S) -> Self {
        Self::StoreConnection(msg.into())
    }

    /// Create vector store error
    pub fn vector_store<S: Into<String>>(msg: S) -> Self {
        Self::VectorStore(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

impl MedSearchError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
            Self::Embedding(_) => 500,
            Self::StoreConnection(_) => 500,
            Self::VectorStore(_) => 500,
            Self::Network(_) => 503,
            Self::Io(_) => 500,
            Self::Json(_) => 400,
            Self::Csv(_) => 400,
            Self::Other(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(MedSearchError::invalid_input("blank").status_code(), 400);
        assert_eq!(MedSearchError::not_found("x").status_code(), 404);
        assert_eq!(MedSearchError::embedding("timeout").status_code(), 500);
        assert_eq!(MedSearchError::store_connection("down").status_code(), 500);
    }

    #[test]
    fn test_display() {
        let err = MedSearchError::config("PINECONE_API_KEY not set");
        assert_eq!(err.to_string(), "Configuration error: PINECONE_API_KEY not set");
    }
}
