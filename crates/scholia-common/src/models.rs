//! Transient per-query models. These are owned by a single pipeline
//! execution and discarded once the answer is produced; nothing here
//! is persisted.

use serde::{Deserialize, Serialize};

/// The three decomposed facets of a user question. A `None` field means
/// the corresponding retrieval path does not run for this question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedElements {
    pub metadata_search: Option<String>,
    pub content_search: Option<String>,
    pub general_knowledge: Option<String>,
}

impl ParsedElements {
    pub fn is_empty(&self) -> bool {
        self.metadata_search.is_none()
            && self.content_search.is_none()
            && self.general_knowledge.is_none()
    }
}

/// One fully joined paper record returned by the metadata path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub title: String,
    pub journal: String,
    pub publication_date: String,
    /// Comma-joined author names, insertion order preserved.
    pub authors: String,
    pub paper_id: String,
    pub url: Option<String>,
}

/// A retrieved chunk of paper text plus the denormalized citation
/// metadata it travels with, so it is citable without a join back to
/// the relational store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub content: String,
    pub title: String,
    pub authors: String,
    pub journal: String,
    pub publication_date: String,
    pub paper_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSnippet {
    pub snippet: Snippet,
    pub score: f32,
}

/// Outputs of the two retrieval paths plus the general-knowledge note.
/// `None` means the path did not run; `Some(vec![])` means it ran and
/// found nothing — aggregation treats those differently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub metadata: Option<Vec<MetadataRecord>>,
    pub content: Option<Vec<ScoredSnippet>>,
    pub general: Option<String>,
}
