//! Paper, author, journal and chunk-reference operations.
//!
//! Authors are deduplicated by exact name match at insertion; fuzzy
//! matching happens only at query time through the scalar predicates.
//! Each operation runs in one transaction on the store's connection.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use scholia_common::PaperKey;

use crate::error::{DbError, Result};
use crate::store::MetadataStore;

/// Bibliographic metadata for one paper, ready for insertion.
#[derive(Debug, Clone)]
pub struct PaperMetadata {
    pub key: PaperKey,
    pub title: String,
    /// Order-preserving author list.
    pub authors: Vec<String>,
    /// Human-readable journal name; the journal key is derived from the
    /// paper key.
    pub journal: String,
    pub publication_date: NaiveDate,
    pub url: Option<String>,
    pub file_path: Option<String>,
}

/// Normalize a source publication date to day granularity. Sources that
/// omit month or day get `01` substituted.
pub fn normalize_publication_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let padded = match raw.chars().filter(|c| *c == '-').count() {
        0 => format!("{raw}-01-01"),
        1 => format!("{raw}-01"),
        _ => raw.to_string(),
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d")
        .map_err(|_| DbError::InvalidDate(raw.to_string()))
}

fn get_or_create_author(conn: &Connection, name: &str) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row("SELECT author_id FROM authors WHERE name = ?1", [name], |r| r.get(0))
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute("INSERT INTO authors (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

fn get_or_create_journal(conn: &Connection, journal_id: &str, name: &str) -> Result<()> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT journal_id FROM journals WHERE journal_id = ?1",
            [journal_id],
            |r| r.get(0),
        )
        .optional()?;
    if exists.is_none() {
        conn.execute(
            "INSERT INTO journals (journal_id, name) VALUES (?1, ?2)",
            params![journal_id, name],
        )?;
    }
    Ok(())
}

impl MetadataStore {
    pub fn paper_exists(&self, key: &PaperKey) -> Result<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT paper_id FROM papers WHERE paper_id = ?1",
                [key.to_string()],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert a new paper with its authors and journal. Re-ingesting an
    /// existing external key is rejected, never silently overwritten.
    pub fn add_paper(&mut self, meta: &PaperMetadata) -> Result<()> {
        if self.paper_exists(&meta.key)? {
            return Err(DbError::PaperExists(meta.key.to_string()));
        }

        let paper_id = meta.key.to_string();
        let journal_id = meta.key.journal_key();

        let tx = self.conn.transaction()?;
        get_or_create_journal(&tx, &journal_id, &meta.journal)?;
        tx.execute(
            "INSERT INTO papers (paper_id, journal_id, title, publication_date, url, file_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                paper_id,
                journal_id,
                meta.title,
                meta.publication_date.format("%Y-%m-%d").to_string(),
                meta.url,
                meta.file_path,
            ],
        )?;
        for (position, author) in meta.authors.iter().enumerate() {
            let author_id = get_or_create_author(&tx, author)?;
            tx.execute(
                "INSERT OR IGNORE INTO author_paper (author_id, paper_id, position)
                 VALUES (?1, ?2, ?3)",
                params![author_id, paper_id, position as i64],
            )?;
        }
        tx.commit()?;

        tracing::info!(paper_id = %paper_id, title = %meta.title, "paper added");
        Ok(())
    }

    /// Record the vector-store chunk IDs for a paper, preserving order.
    /// The paper row must already exist; ingestion writes vectors first,
    /// then the paper row, then these references.
    pub fn add_chunks(&mut self, key: &PaperKey, chunk_ids: &[String]) -> Result<()> {
        if !self.paper_exists(key)? {
            return Err(DbError::PaperNotFound(key.to_string()));
        }
        let paper_id = key.to_string();
        let tx = self.conn.transaction()?;
        for (position, chunk_id) in chunk_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO chunk_ids (chunk_id, paper_id, position) VALUES (?1, ?2, ?3)",
                params![chunk_id, paper_id, position as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Ordered chunk IDs previously recorded for a paper.
    pub fn chunk_ids_for_paper(&self, key: &PaperKey) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT chunk_id FROM chunk_ids WHERE paper_id = ?1 ORDER BY position",
        )?;
        let ids = stmt
            .query_map([key.to_string()], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    /// Remove papers and everything referencing them: collection
    /// membership, author links and chunk references. Collections
    /// themselves are left in place.
    pub fn remove_papers(&mut self, keys: &[PaperKey]) -> Result<()> {
        for key in keys {
            if !self.paper_exists(key)? {
                return Err(DbError::PaperNotFound(key.to_string()));
            }
        }
        let tx = self.conn.transaction()?;
        for key in keys {
            let paper_id = key.to_string();
            tx.execute("DELETE FROM paper_collection WHERE paper_id = ?1", [&paper_id])?;
            tx.execute("DELETE FROM author_paper WHERE paper_id = ?1", [&paper_id])?;
            tx.execute("DELETE FROM chunk_ids WHERE paper_id = ?1", [&paper_id])?;
            tx.execute("DELETE FROM papers WHERE paper_id = ?1", [&paper_id])?;
            tracing::info!(paper_id = %paper_id, "paper removed");
        }
        tx.commit()?;
        Ok(())
    }

    pub fn all_paper_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT paper_id FROM papers ORDER BY paper_id")?;
        let ids = stmt
            .query_map([], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    pub fn paper_count(&self) -> Result<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM papers", [], |r| r.get(0))?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_paper(key: &str) -> PaperMetadata {
        PaperMetadata {
            key: key.parse().unwrap(),
            title: "Mixed selectivity in prefrontal cortex".to_string(),
            authors: vec!["Mattia Rigotti".to_string(), "Stefano Fusi".to_string()],
            journal: "Nature".to_string(),
            publication_date: NaiveDate::from_ymd_opt(2013, 5, 19).unwrap(),
            url: Some("https://doi.org/10.1038/nature12160".to_string()),
            file_path: None,
        }
    }

    #[test]
    fn test_add_and_reject_duplicate_key() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        let meta = sample_paper("doi:10.1000/xyz");
        store.add_paper(&meta).unwrap();

        let err = store.add_paper(&meta).unwrap_err();
        assert!(matches!(err, DbError::PaperExists(_)));
        assert_eq!(store.paper_count().unwrap(), 1);
    }

    #[test]
    fn test_authors_deduplicated_exactly() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        store.add_paper(&sample_paper("doi:10.1000/a")).unwrap();
        let mut second = sample_paper("doi:10.1000/b");
        second.authors = vec!["Stefano Fusi".to_string(), "stefano fusi".to_string()];
        store.add_paper(&second).unwrap();

        // Exact match dedups "Stefano Fusi"; the case variant is a new row.
        let n: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM authors", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn test_journal_derived_from_paper_key() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        store.add_paper(&sample_paper("doi:10.1038/nature12160")).unwrap();
        let journal_id: String = store
            .connection()
            .query_row(
                "SELECT journal_id FROM papers WHERE paper_id = 'doi:10.1038/nature12160'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(journal_id, "10.1038");
    }

    #[test]
    fn test_date_normalization_defaults_month_and_day() {
        assert_eq!(
            normalize_publication_date("2020").unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
        );
        assert_eq!(
            normalize_publication_date("2020-07").unwrap(),
            NaiveDate::from_ymd_opt(2020, 7, 1).unwrap()
        );
        assert_eq!(
            normalize_publication_date("2020-07-15").unwrap(),
            NaiveDate::from_ymd_opt(2020, 7, 15).unwrap()
        );
        assert!(normalize_publication_date("yesterday").is_err());
    }

    #[test]
    fn test_chunk_ids_roundtrip_preserves_order() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        let meta = sample_paper("doi:10.1000/xyz");
        store.add_paper(&meta).unwrap();

        let chunks = vec!["c2".to_string(), "c0".to_string(), "c1".to_string()];
        store.add_chunks(&meta.key, &chunks).unwrap();
        assert_eq!(store.chunk_ids_for_paper(&meta.key).unwrap(), chunks);
    }

    #[test]
    fn test_add_chunks_requires_existing_paper() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        let key: PaperKey = "doi:10.1000/xyz".parse().unwrap();
        let err = store.add_chunks(&key, &["c0".to_string()]).unwrap_err();
        assert!(matches!(err, DbError::PaperNotFound(_)));
    }

    #[test]
    fn test_remove_papers_cleans_references() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        let meta = sample_paper("doi:10.1000/xyz");
        store.add_paper(&meta).unwrap();
        store.add_chunks(&meta.key, &["c0".to_string()]).unwrap();

        store.remove_papers(&[meta.key.clone()]).unwrap();
        assert_eq!(store.paper_count().unwrap(), 0);
        let n: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM chunk_ids", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }
}
