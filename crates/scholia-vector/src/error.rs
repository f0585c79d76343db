//! Error types for vector storage and content search.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorError>;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("vector store error: {0}")]
    Store(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("reranking error: {0}")]
    Rerank(String),

    /// A search restriction named paper IDs that have no chunks in the
    /// store. Searching anyway would silently widen the scope, so the
    /// caller gets the missing IDs instead.
    #[error("paper IDs not present in vector store: {}", .0.join(", "))]
    MissingPaperIds(Vec<String>),

    #[error("collection {0:?} does not exist in the vector store")]
    CollectionMissing(String),
}

impl From<qdrant_client::QdrantError> for VectorError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        VectorError::Store(err.to_string())
    }
}
