//! scholia-vector — vector-store access and content search.
//!
//! The core never subclasses or re-exports a vector-database library
//! type: [`store::VectorStore`] is the whole surface (add documents,
//! existence check by paper ID, similarity search), and the Qdrant
//! adapter holds its client by composition. Content search over-fetches
//! a candidate pool, then a cross-encoder reranker cuts it down to the
//! requested top-k.

pub mod error;
pub mod rerank;
pub mod search;
pub mod store;

pub use error::{Result, VectorError};
pub use rerank::{FastembedReranker, SnippetReranker};
pub use search::ContentSearch;
pub use store::{ChunkDocument, QdrantStore, VectorStore};
