//! Error types for the agent pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] scholia_llm::LlmError),

    #[error(transparent)]
    Db(#[from] scholia_db::DbError),

    #[error("prompt template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The decomposition model refused the question, usually because it
    /// bundles several independent asks. Carries the model's message
    /// verbatim so the user sees the reason.
    #[error("{0}")]
    AmbiguousQuestion(String),

    #[error("decomposition response has {found} lines, expected 3")]
    MalformedDecomposition { found: usize },

    #[error("decomposition line missing label {label:?}: {line:?}")]
    MissingLabel { label: &'static str, line: String },

    #[error("SQL response has neither the query prefix nor the no-query sentinel: {0:?}")]
    InvalidSqlResponse(String),

    #[error("SQL response is empty")]
    EmptySqlResponse,

    /// A results section is populated but the sub-intent that should
    /// have produced it was never recorded.
    #[error("{section} results present without a matching sub-intent")]
    ResultsWithoutIntent { section: &'static str },
}
