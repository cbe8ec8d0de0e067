//! MedSearch Embedding
//!
//! Text → fixed-length vector, through a hosted feature-extraction endpoint
//! or an in-process sentence-embedding model (`local-model` feature).

mod embedder;
#[cfg(feature = "local-model")]
mod local;
mod phrasing;
mod remote;
mod types;

pub use embedder::{build_embedder, Embedder};
#[cfg(feature = "local-model")]
pub use local::LocalEmbedder;
pub use phrasing::{catalog_text, web_query_text, QueryPhrasing};
pub use remote::RemoteEmbedder;
pub use types::{
    Embedding, EmbeddingFailure, FeatureExtractionOptions, FeatureExtractionRequest,
    FeatureExtractionResponse,
};
