use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScholiaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid paper key: {0}")]
    InvalidPaperKey(String),
}

pub type Result<T> = std::result::Result<T, ScholiaError>;
