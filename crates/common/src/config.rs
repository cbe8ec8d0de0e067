use crate::error::MedSearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Strategy used to turn text into embeddings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// In-process sentence-embedding model
    Local,
    /// Hosted feature-extraction endpoint
    Remote,
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        if cfg!(feature = "local-model") {
            Self::Local
        } else {
            Self::Remote
        }
    }
}

impl FromStr for EmbeddingBackend {
    type Err = MedSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" | "api" => Ok(Self::Remote),
            other => Err(MedSearchError::config(format!(
                "Unknown embedding backend '{}' (expected 'local' or 'remote')",
                other
            ))),
        }
    }
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Parameters used only when the vector index has to be created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name
    pub name: String,

    /// Vector dimension
    pub dimension: usize,

    /// Similarity metric (cosine, dotproduct, euclidean)
    pub metric: String,

    /// Serverless cloud provider
    pub cloud: String,

    /// Serverless region
    pub region: String,
}

/// MedSearch application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pinecone API key
    pub pinecone_api_key: String,

    /// Index provisioning parameters
    pub index: IndexSpec,

    /// Data-plane host of the index, resolved through the control plane when unset
    pub pinecone_index_host: Option<String>,

    /// Pinecone control-plane base URL
    pub pinecone_control_url: String,

    /// Embedding strategy
    pub embedding_backend: EmbeddingBackend,

    /// Embedding model name
    pub embedding_model: String,

    /// Hugging Face inference token (remote backend only)
    pub hf_api_token: Option<String>,

    /// Feature-extraction endpoint base URL
    pub hf_api_url: String,

    /// Remote embedding request timeout in seconds
    pub embedding_timeout_secs: u64,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Directory holding the search page and its assets
    pub static_dir: PathBuf,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pinecone_api_key: String::new(),
            index: IndexSpec::default(),
            pinecone_index_host: None,
            pinecone_control_url: "https://api.pinecone.io".to_string(),
            embedding_backend: EmbeddingBackend::default(),
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            hf_api_token: None,
            hf_api_url: "https://api-inference.huggingface.co/pipeline/feature-extraction"
                .to_string(),
            embedding_timeout_secs: 20,
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            static_dir: PathBuf::from("./static"),
            log_dir: PathBuf::from("./log"),
            log_level: "info".to_string(),
        }
    }
}

impl Default for IndexSpec {
    fn default() -> Self {
        Self {
            name: "medicine-info".to_string(),
            dimension: crate::EMBEDDING_DIM,
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, MedSearchError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Fails fast when `PINECONE_API_KEY` is absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MedSearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let pinecone_api_key = get("PINECONE_API_KEY").ok_or_else(|| {
            MedSearchError::config("PINECONE_API_KEY not found in environment variables")
        })?;

        let embedding_backend = match get("EMBEDDING_BACKEND") {
            Some(v) => v.parse()?,
            None => defaults.embedding_backend,
        };

        let index = IndexSpec {
            name: get("PINECONE_INDEX_NAME").unwrap_or(defaults.index.name),
            dimension: crate::EMBEDDING_DIM,
            metric: get("PINECONE_METRIC").unwrap_or(defaults.index.metric),
            cloud: get("PINECONE_CLOUD").unwrap_or(defaults.index.cloud),
            region: get("PINECONE_REGION").unwrap_or(defaults.index.region),
        };

        let config = Self {
            pinecone_api_key,
            index,
            pinecone_index_host: get("PINECONE_INDEX_HOST"),
            pinecone_control_url: get("PINECONE_CONTROL_URL")
                .unwrap_or(defaults.pinecone_control_url),
            embedding_backend,
            embedding_model: get("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            hf_api_token: get("HF_API_TOKEN"),
            hf_api_url: get("HF_API_URL").unwrap_or(defaults.hf_api_url),
            embedding_timeout_secs: get("EMBEDDING_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.embedding_timeout_secs),
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: get("SERVER_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.server_port),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            log_dir: get("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        config.validate()?;

        Ok(config)
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Remote embedding request timeout
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), MedSearchError> {
        if self.pinecone_api_key.trim().is_empty() {
            return Err(MedSearchError::config("Pinecone API key cannot be empty"));
        }

        if self.index.name.is_empty() {
            return Err(MedSearchError::config("Index name cannot be empty"));
        }

        for (label, url) in [
            ("Pinecone control URL", &self.pinecone_control_url),
            ("Feature-extraction URL", &self.hf_api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(MedSearchError::config(format!(
                    "{} must start with http:// or https://",
                    label
                )));
            }
        }

        if self.embedding_backend == EmbeddingBackend::Remote && self.hf_api_token.is_none() {
            return Err(MedSearchError::config(
                "HF_API_TOKEN is required when EMBEDDING_BACKEND=remote",
            ));
        }

        if self.embedding_timeout_secs == 0 {
            return Err(MedSearchError::config("Embedding timeout cannot be 0"));
        }

        // Validate port range
        if self.server_port == 0 {
            return Err(MedSearchError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}
