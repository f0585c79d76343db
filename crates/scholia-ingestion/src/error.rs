//! Error types for ingestion.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid sidecar JSON in {path}: {source}")]
    Sidecar {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("markdown file {0} has no JSON sidecar")]
    MissingSidecar(PathBuf),

    #[error(transparent)]
    Db(#[from] scholia_db::DbError),

    #[error(transparent)]
    Vector(#[from] scholia_vector::VectorError),

    #[error(transparent)]
    Common(#[from] scholia_common::ScholiaError),
}
