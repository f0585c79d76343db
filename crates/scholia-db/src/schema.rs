//! Relational schema for the metadata store.
//!
//! [`SCHEMA`] is both the DDL executed at startup and the grounding text
//! embedded in the text-to-SQL prompt; the two must stay byte-identical,
//! which is why there is exactly one copy.

use rusqlite::Connection;

use crate::error::Result;

pub const TABLE_PAPERS: &str = "papers";
pub const TABLE_AUTHORS: &str = "authors";
pub const TABLE_JOURNALS: &str = "journals";
pub const TABLE_COLLECTIONS: &str = "collections";

/// Name of the distinguished collection holding every paper.
pub const ALL_PAPERS_COLLECTION: &str = "all papers";

pub const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS journals (
    journal_id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS papers (
    paper_id TEXT PRIMARY KEY,
    journal_id TEXT REFERENCES journals(journal_id),
    title TEXT NOT NULL,
    publication_date DATE,
    url TEXT,
    file_path TEXT
);

CREATE TABLE IF NOT EXISTS authors (
    author_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS collections (
    collection_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS author_paper (
    author_id INTEGER NOT NULL REFERENCES authors(author_id),
    paper_id TEXT NOT NULL REFERENCES papers(paper_id),
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (author_id, paper_id)
);

CREATE TABLE IF NOT EXISTS paper_collection (
    paper_id TEXT NOT NULL REFERENCES papers(paper_id),
    collection_id INTEGER NOT NULL REFERENCES collections(collection_id),
    PRIMARY KEY (paper_id, collection_id)
);

CREATE TABLE IF NOT EXISTS chunk_ids (
    chunk_id TEXT PRIMARY KEY,
    paper_id TEXT NOT NULL REFERENCES papers(paper_id),
    position INTEGER NOT NULL DEFAULT 0
);
";

/// Create all tables if they do not exist.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    tracing::info!("metadata schema initialized");
    Ok(())
}
