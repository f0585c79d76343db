//! Ingestion pipeline: markdown + sidecar in, both stores updated.

use std::path::Path;

use tracing::{info, warn};
use uuid::Uuid;

use scholia_db::MetadataStore;
use scholia_vector::{ChunkDocument, VectorStore};

use crate::chunker::{chunk_text, ChunkerConfig};
use crate::error::Result;
use crate::sidecar::{load_document, markdown_files};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested,
    /// The paper's external key is already in the store.
    Duplicate,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub ingested: usize,
    pub duplicates: usize,
    pub failures: usize,
}

pub struct IngestionPipeline<'a, V> {
    store: &'a mut MetadataStore,
    vectors: &'a V,
    chunker: ChunkerConfig,
}

impl<'a, V: VectorStore> IngestionPipeline<'a, V> {
    pub fn new(store: &'a mut MetadataStore, vectors: &'a V) -> Self {
        Self {
            store,
            vectors,
            chunker: ChunkerConfig::default(),
        }
    }

    pub fn with_chunker(mut self, chunker: ChunkerConfig) -> Self {
        self.chunker = chunker;
        self
    }

    /// Ingests one markdown document.
    ///
    /// Vectors are written before the paper row. A crash in between
    /// leaves orphaned vectors, which a later re-ingest tolerates; the
    /// reverse order could leave a paper row whose chunks were never
    /// indexed, which nothing would ever repair.
    pub async fn ingest_document(&mut self, md_path: &Path) -> Result<IngestOutcome> {
        let (text, sidecar) = load_document(md_path)?;
        let meta = sidecar.into_paper_metadata(md_path)?;

        if self.store.paper_exists(&meta.key)? {
            info!(key = %meta.key, "paper already ingested, skipping");
            return Ok(IngestOutcome::Duplicate);
        }

        let chunks = chunk_text(&text, &self.chunker);
        let chunk_ids: Vec<String> = chunks.iter().map(|_| Uuid::new_v4().to_string()).collect();

        let authors = meta.authors.join(", ");
        let documents: Vec<ChunkDocument> = chunks
            .into_iter()
            .zip(chunk_ids.iter())
            .map(|(content, chunk_id)| ChunkDocument {
                chunk_id: chunk_id.clone(),
                paper_id: meta.key.to_string(),
                content,
                title: meta.title.clone(),
                authors: authors.clone(),
                journal: meta.journal.clone(),
                publication_date: meta.publication_date.to_string(),
            })
            .collect();

        self.vectors.add_documents(documents).await?;
        self.store.add_paper(&meta)?;
        self.store.add_chunks(&meta.key, &chunk_ids)?;

        info!(key = %meta.key, chunks = chunk_ids.len(), "paper ingested");
        Ok(IngestOutcome::Ingested)
    }

    /// Ingests every markdown file in a folder, continuing past
    /// individual failures.
    pub async fn ingest_folder(&mut self, folder: &Path) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        for md_path in markdown_files(folder)? {
            match self.ingest_document(&md_path).await {
                Ok(IngestOutcome::Ingested) => report.ingested += 1,
                Ok(IngestOutcome::Duplicate) => report.duplicates += 1,
                Err(err) => {
                    warn!(path = %md_path.display(), error = %err, "failed to ingest document");
                    report.failures += 1;
                }
            }
        }
        info!(
            ingested = report.ingested,
            duplicates = report.duplicates,
            failures = report.failures,
            "folder ingestion finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use scholia_common::models::ScoredSnippet;
    use scholia_vector::VectorError;

    /// Records calls so the write ordering can be asserted.
    #[derive(Default)]
    struct RecordingStore {
        added: Mutex<Vec<ChunkDocument>>,
        fail_adds: bool,
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn add_documents(
            &self,
            documents: Vec<ChunkDocument>,
        ) -> std::result::Result<(), VectorError> {
            if self.fail_adds {
                return Err(VectorError::Store("unavailable".into()));
            }
            self.added.lock().unwrap().extend(documents);
            Ok(())
        }

        async fn check_ids_exist(
            &self,
            _paper_ids: &[String],
        ) -> std::result::Result<Vec<String>, VectorError> {
            Ok(Vec::new())
        }

        async fn similarity_search(
            &self,
            _query: &str,
            _limit: usize,
            _restrict_to: Option<&[String]>,
        ) -> std::result::Result<Vec<ScoredSnippet>, VectorError> {
            Ok(Vec::new())
        }
    }

    fn write_document(dir: &Path, stem: &str, paper_id: &str) -> std::path::PathBuf {
        let md = dir.join(format!("{stem}.md"));
        std::fs::write(&md, "Body text about classification methods.").unwrap();
        std::fs::write(
            dir.join(format!("{stem}.json")),
            format!(
                r#"{{
                    "paper_id": "{paper_id}",
                    "title": "A Paper",
                    "authors": ["Ada Lovelace", "Charles Babbage"],
                    "journal": "J. Test",
                    "publication_date": "2021-03-01"
                }}"#
            ),
        )
        .unwrap();
        md
    }

    #[tokio::test]
    async fn ingest_writes_vectors_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let md = write_document(dir.path(), "paper", "doi:10.1000/xyz");

        let mut store = MetadataStore::open_in_memory().unwrap();
        let vectors = RecordingStore::default();
        let mut pipeline = IngestionPipeline::new(&mut store, &vectors);

        let outcome = pipeline.ingest_document(&md).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Ingested);

        let added = vectors.added.lock().unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].paper_id, "doi:10.1000/xyz");
        assert_eq!(added[0].authors, "Ada Lovelace, Charles Babbage");
        drop(added);

        assert_eq!(store.paper_count().unwrap(), 1);
        let key = "doi:10.1000/xyz".parse().unwrap();
        assert_eq!(store.chunk_ids_for_paper(&key).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reingesting_the_same_key_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let md = write_document(dir.path(), "paper", "doi:10.1000/xyz");

        let mut store = MetadataStore::open_in_memory().unwrap();
        let vectors = RecordingStore::default();
        let mut pipeline = IngestionPipeline::new(&mut store, &vectors);

        pipeline.ingest_document(&md).await.unwrap();
        let second = pipeline.ingest_document(&md).await.unwrap();
        assert_eq!(second, IngestOutcome::Duplicate);
        assert_eq!(store.paper_count().unwrap(), 1);
        assert_eq!(vectors.added.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn vector_failure_leaves_no_paper_row() {
        let dir = tempfile::tempdir().unwrap();
        let md = write_document(dir.path(), "paper", "doi:10.1000/xyz");

        let mut store = MetadataStore::open_in_memory().unwrap();
        let vectors = RecordingStore {
            fail_adds: true,
            ..Default::default()
        };
        let mut pipeline = IngestionPipeline::new(&mut store, &vectors);

        assert!(pipeline.ingest_document(&md).await.is_err());
        assert_eq!(store.paper_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn folder_ingestion_continues_past_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        write_document(dir.path(), "good", "doi:10.1000/xyz");
        // Markdown with no sidecar.
        std::fs::write(dir.path().join("orphan.md"), "text").unwrap();

        let mut store = MetadataStore::open_in_memory().unwrap();
        let vectors = RecordingStore::default();
        let mut pipeline = IngestionPipeline::new(&mut store, &vectors);

        let report = pipeline.ingest_folder(dir.path()).await.unwrap();
        assert_eq!(report.ingested, 1);
        assert_eq!(report.failures, 1);
    }
}
