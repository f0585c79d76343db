//! scholia-common — shared types used across all Scholia crates.

pub mod error;
pub mod models;
pub mod paper_key;

pub use error::ScholiaError;
pub use models::{MetadataRecord, ParsedElements, ScoredSnippet, SearchResults, Snippet};
pub use paper_key::PaperKey;
