//! Vector store trait and the Qdrant adapter.
//!
//! The adapter holds the Qdrant client and the embedding model by
//! composition; nothing above this module sees a Qdrant type. Chunk
//! payloads carry denormalized citation fields so a search hit can be
//! rendered without a round trip to the metadata database.

use std::collections::HashMap;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};

use scholia_common::models::{ScoredSnippet, Snippet};

use crate::error::{Result, VectorError};

/// all-MiniLM-L6-v2 output dimension.
const EMBEDDING_DIM: u64 = 384;

/// One chunk of paper text ready for indexing.
#[derive(Debug, Clone)]
pub struct ChunkDocument {
    /// UUID string, doubles as the Qdrant point ID.
    pub chunk_id: String,
    pub paper_id: String,
    pub content: String,
    pub title: String,
    pub authors: String,
    pub journal: String,
    pub publication_date: String,
}

/// Storage surface the rest of the workspace programs against.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embeds and upserts chunk documents.
    async fn add_documents(&self, documents: Vec<ChunkDocument>) -> Result<()>;

    /// Returns the subset of `paper_ids` that have no chunks in the store.
    async fn check_ids_exist(&self, paper_ids: &[String]) -> Result<Vec<String>>;

    /// Nearest-neighbour search, optionally restricted to the given
    /// paper IDs.
    async fn similarity_search(
        &self,
        query: &str,
        limit: usize,
        restrict_to: Option<&[String]>,
    ) -> Result<Vec<ScoredSnippet>>;
}

pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    // fastembed sessions are not Sync; serialize access.
    embedder: Mutex<TextEmbedding>,
}

impl QdrantStore {
    /// Connects to Qdrant and creates the collection when it does not
    /// exist yet.
    pub async fn connect(url: &str, collection: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build()?;

        if !client.collection_exists(collection).await? {
            info!(collection, "creating vector collection");
            client
                .create_collection(
                    CreateCollectionBuilder::new(collection)
                        .vectors_config(VectorParamsBuilder::new(EMBEDDING_DIM, Distance::Cosine)),
                )
                .await?;
        }

        let embedder = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
            .map_err(|e| VectorError::Embedding(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
            embedder: Mutex::new(embedder),
        })
    }

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut embedder = self.embedder.lock().await;
        embedder
            .embed(texts, None)
            .map_err(|e| VectorError::Embedding(e.to_string()))
    }
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> String {
    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => s.clone(),
        _ => String::new(),
    }
}

fn restriction_filter(paper_ids: &[String]) -> Filter {
    Filter::must([Condition::matches("paper_id", paper_ids.to_vec())])
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn add_documents(&self, documents: Vec<ChunkDocument>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = self.embed(texts).await?;

        let points = documents
            .into_iter()
            .zip(vectors)
            .map(|(doc, vector)| {
                let payload: Payload = json!({
                    "paper_id": doc.paper_id,
                    "content": doc.content,
                    "title": doc.title,
                    "authors": doc.authors,
                    "journal": doc.journal,
                    "publication_date": doc.publication_date,
                })
                .try_into()
                .expect("chunk payload is a JSON object");
                PointStruct::new(doc.chunk_id, vector, payload)
            })
            .collect::<Vec<_>>();

        debug!(points = points.len(), "upserting chunk vectors");
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;
        Ok(())
    }

    async fn check_ids_exist(&self, paper_ids: &[String]) -> Result<Vec<String>> {
        let mut missing = Vec::new();
        for paper_id in paper_ids {
            let hits = self
                .client
                .scroll(
                    ScrollPointsBuilder::new(&self.collection)
                        .filter(Filter::must([Condition::matches(
                            "paper_id",
                            paper_id.clone(),
                        )]))
                        .limit(1)
                        .with_payload(false)
                        .with_vectors(false),
                )
                .await?;
            if hits.result.is_empty() {
                missing.push(paper_id.clone());
            }
        }
        Ok(missing)
    }

    async fn similarity_search(
        &self,
        query: &str,
        limit: usize,
        restrict_to: Option<&[String]>,
    ) -> Result<Vec<ScoredSnippet>> {
        let query_vector = self
            .embed(vec![query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::Embedding("empty embedding batch".into()))?;

        let mut search =
            SearchPointsBuilder::new(&self.collection, query_vector, limit as u64)
                .with_payload(true);
        if let Some(ids) = restrict_to {
            search = search.filter(restriction_filter(ids));
        }

        let response = self.client.search_points(search).await?;
        let snippets = response
            .result
            .into_iter()
            .map(|point| ScoredSnippet {
                snippet: Snippet {
                    content: payload_str(&point.payload, "content"),
                    title: payload_str(&point.payload, "title"),
                    authors: payload_str(&point.payload, "authors"),
                    journal: payload_str(&point.payload, "journal"),
                    publication_date: payload_str(&point.payload, "publication_date"),
                    paper_id: payload_str(&point.payload, "paper_id"),
                },
                score: point.score,
            })
            .collect();
        Ok(snippets)
    }
}
