//! Cross-encoder reranking of search candidates.

use std::sync::Mutex;

use fastembed::{RerankInitOptions, RerankerModel, TextRerank};
use tracing::debug;

use scholia_common::models::ScoredSnippet;

use crate::error::{Result, VectorError};

/// Reorders a candidate pool against the query and keeps the best
/// `top_k`. Scores on the returned snippets are relevance scores from
/// the reranker, not the original vector distances.
pub trait SnippetReranker: Send + Sync {
    fn rerank(
        &self,
        query: &str,
        candidates: Vec<ScoredSnippet>,
        top_k: usize,
    ) -> Result<Vec<ScoredSnippet>>;
}

pub struct FastembedReranker {
    model: Mutex<TextRerank>,
}

impl FastembedReranker {
    pub fn new() -> Result<Self> {
        let model = TextRerank::try_new(RerankInitOptions::new(RerankerModel::BGERerankerBase))
            .map_err(|e| VectorError::Rerank(e.to_string()))?;
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl SnippetReranker for FastembedReranker {
    fn rerank(
        &self,
        query: &str,
        candidates: Vec<ScoredSnippet>,
        top_k: usize,
    ) -> Result<Vec<ScoredSnippet>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<&str> = candidates
            .iter()
            .map(|c| c.snippet.content.as_str())
            .collect();

        let mut model = self
            .model
            .lock()
            .map_err(|_| VectorError::Rerank("reranker mutex poisoned".into()))?;
        let ranked = model
            .rerank(query, documents, false, None)
            .map_err(|e| VectorError::Rerank(e.to_string()))?;
        drop(model);

        debug!(candidates = candidates.len(), top_k, "reranked candidate pool");

        // Results come back sorted by relevance; map indices back to the
        // original snippets.
        let mut out = Vec::with_capacity(top_k.min(candidates.len()));
        for result in ranked.into_iter().take(top_k) {
            let snippet = candidates[result.index].snippet.clone();
            out.push(ScoredSnippet {
                snippet,
                score: result.score,
            });
        }
        Ok(out)
    }
}
