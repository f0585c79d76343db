//! scholia-db — SQLite metadata store for papers, authors, journals and
//! collections.
//!
//! The store is a plain handle (no process-wide singleton): construct it
//! with [`MetadataStore::open`] and pass it where needed, or use
//! [`MetadataStore::open_in_memory`] in tests. Connection setup registers
//! the custom string-distance scalar functions that generated metadata
//! queries rely on, so the handle keeps its connection for its lifetime
//! rather than reconnecting per statement.

pub mod collections;
pub mod error;
pub mod functions;
pub mod papers;
pub mod query;
pub mod schema;
pub mod store;
pub mod string_match;

pub use error::{DbError, Result};
pub use papers::PaperMetadata;
pub use store::MetadataStore;
