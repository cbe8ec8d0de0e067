//! MedSearch Vector Retrieval
//!
//! Vector store access (Pinecone, in-memory), catalog bulk loading, and the
//! lookup pipeline that turns the best match into a response record.

mod loader;
mod memory;
mod normalize;
pub mod pinecone;
mod retriever;
mod similarity;
mod store;
mod types;

pub use loader::{BulkLoader, Catalog, LoadReport, UPSERT_BATCH_SIZE};
pub use memory::InMemoryStore;
pub use normalize::{
    format_score, probe_indexed, ProbeBounds, ResponseRecord, NOT_AVAILABLE, NO_SIDE_EFFECTS,
    NO_SUBSTITUTES, NO_USES,
};
pub use pinecone::{PineconeClient, PineconeConnector, PineconeIndex};
pub use retriever::{Retriever, SearchError, SearchOutcome, SEARCH_TOP_K};
pub use similarity::cosine_similarity;
pub use store::{StoreConnector, VectorStore};
pub use types::{Metadata, MedicineRecord, ScoredMatch, VectorStoreEntry};
