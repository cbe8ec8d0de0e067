pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingBackend, IndexSpec};
pub use error::MedSearchError;
pub type Result<T> = std::result::Result<T, MedSearchError>;

/// Dimension of every embedding stored in or queried from the medicine index
pub const EMBEDDING_DIM: usize = 384;
