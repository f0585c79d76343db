//! Content search orchestration: over-fetch, restriction checks, rerank.

use tracing::{debug, warn};

use scholia_common::models::ScoredSnippet;

use crate::error::{Result, VectorError};
use crate::rerank::SnippetReranker;
use crate::store::VectorStore;

/// Candidate pool fetched before reranking.
const DEFAULT_FETCH_K: usize = 100;

pub struct ContentSearch<S, R> {
    store: S,
    reranker: R,
    fetch_k: usize,
}

impl<S: VectorStore, R: SnippetReranker> ContentSearch<S, R> {
    pub fn new(store: S, reranker: R) -> Self {
        Self {
            store,
            reranker,
            fetch_k: DEFAULT_FETCH_K,
        }
    }

    pub fn with_fetch_k(mut self, fetch_k: usize) -> Self {
        self.fetch_k = fetch_k;
        self
    }

    /// Searches chunk content for `query`.
    ///
    /// With `restrict_to`, the search only considers chunks of the named
    /// papers; an empty restriction means nothing qualifies and the
    /// result is empty rather than a search of the whole corpus. When a
    /// restricted ID has no chunks at all the call fails, since a
    /// silently narrower search would misattribute the answer.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        restrict_to: Option<&[String]>,
    ) -> Result<Vec<ScoredSnippet>> {
        if let Some(ids) = restrict_to {
            if ids.is_empty() {
                debug!("empty restriction set, skipping content search");
                return Ok(Vec::new());
            }
            let missing = self.store.check_ids_exist(ids).await?;
            if !missing.is_empty() {
                warn!(missing = missing.len(), "restricted paper IDs absent from vector store");
                return Err(VectorError::MissingPaperIds(missing));
            }
        }

        let candidates = self
            .store
            .similarity_search(query, self.fetch_k, restrict_to)
            .await?;
        debug!(candidates = candidates.len(), "fetched candidate pool");
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        self.reranker.rerank(query, candidates, top_k)
    }
}
