//! Metadata store error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Paper already exists with ID '{0}'")]
    PaperExists(String),

    #[error("No paper found with ID '{0}'")]
    PaperNotFound(String),

    #[error("Collection already exists with name '{0}'")]
    CollectionExists(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("At least two collections are required to merge, found {found}")]
    MergeRequiresTwo { found: usize },

    #[error("Query contains potentially destructive operations: {0}")]
    UnsafeQuery(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid publication date '{0}'")]
    InvalidDate(String),
}
