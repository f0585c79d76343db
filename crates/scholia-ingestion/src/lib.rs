//! scholia-ingestion — turning parsed papers into indexed state.
//!
//! PDF parsing itself happens upstream; this crate consumes a folder of
//! markdown files, each with a JSON sidecar carrying the paper's
//! metadata, chunks the text, and writes to both stores. Write order is
//! load-bearing: vectors go in first, the paper row second, so a crash
//! can orphan vectors but never leave a paper pointing at chunks that
//! do not exist.

pub mod chunker;
pub mod error;
pub mod pipeline;
pub mod sidecar;

pub use chunker::{chunk_text, ChunkerConfig};
pub use error::{IngestError, Result};
pub use pipeline::IngestionPipeline;
pub use sidecar::PaperSidecar;
