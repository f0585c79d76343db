//! Question decomposition into the three sub-intents.
//!
//! The parsing steps are split into small free functions because the
//! downstream aggregation format is rigid: a single mis-split silently
//! corrupts one of the three sub-intents, so each step is testable on
//! its own.

use tracing::{debug, info};

use scholia_common::models::ParsedElements;
use scholia_llm::{CompletionBackend, Message};

use crate::error::{AgentError, Result};
use crate::prompts;

/// Substring the model uses to refuse a multi-intent question.
pub const ERROR_SENTINEL: &str = "Error:";

pub const METADATA_LABEL: &str = "Metadata Search:";
pub const CONTENT_LABEL: &str = "Content Search:";
pub const GENERAL_LABEL: &str = "General Knowledge:";

/// Returns the refusal message when the response carries the error
/// sentinel.
pub fn detect_error(response: &str) -> Option<String> {
    if response.contains(ERROR_SENTINEL) {
        Some(response.trim().to_string())
    } else {
        None
    }
}

/// Splits a response into trimmed, non-empty lines.
pub fn split_lines(response: &str) -> Vec<&str> {
    response
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Strips `label` from the line and interprets the remainder. A value
/// that case-insensitively starts with "none" means the sub-intent does
/// not apply.
pub fn extract_field(line: &str, label: &'static str) -> Result<Option<String>> {
    let value = line
        .strip_prefix(label)
        .ok_or_else(|| AgentError::MissingLabel {
            label,
            line: line.to_string(),
        })?
        .trim();
    if value.to_lowercase().starts_with("none") {
        Ok(None)
    } else {
        Ok(Some(value.to_string()))
    }
}

/// Parses a complete decomposition response.
pub fn parse_response(response: &str) -> Result<ParsedElements> {
    if let Some(message) = detect_error(response) {
        return Err(AgentError::AmbiguousQuestion(message));
    }

    let lines = split_lines(response);
    if lines.len() != 3 {
        return Err(AgentError::MalformedDecomposition { found: lines.len() });
    }

    Ok(ParsedElements {
        metadata_search: extract_field(lines[0], METADATA_LABEL)?,
        content_search: extract_field(lines[1], CONTENT_LABEL)?,
        general_knowledge: extract_field(lines[2], GENERAL_LABEL)?,
    })
}

pub struct QuestionDecomposer<B> {
    backend: B,
}

impl<B: CompletionBackend> QuestionDecomposer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn decompose(&self, question: &str) -> Result<ParsedElements> {
        let prompt = prompts::decompose_prompt(question)?;
        debug!(question, "decomposing question");
        let response = self.backend.complete(vec![Message::user(prompt)]).await?;
        let parsed = parse_response(&response)?;
        info!(
            metadata = parsed.metadata_search.is_some(),
            content = parsed.content_search.is_some(),
            general = parsed.general_knowledge.is_some(),
            "question decomposed"
        );
        Ok(parsed)
    }
}
