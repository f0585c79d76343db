//! scholia-agents — the LLM-driven steps of the question pipeline.
//!
//! Four stages, each fatal on malformed model output rather than
//! guessing: question decomposition into three sub-intents, text-to-SQL
//! metadata retrieval, aggregation of retrieval results into one
//! context string, and the final answering call.

pub mod aggregate;
pub mod answer;
pub mod decompose;
pub mod error;
pub mod prompts;
pub mod sql;

pub use aggregate::aggregate_results;
pub use answer::AnsweringAgent;
pub use decompose::QuestionDecomposer;
pub use error::{AgentError, Result};
pub use sql::MetadataAgent;
