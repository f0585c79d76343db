//! Execution of model-generated metadata queries.
//!
//! Generated SQL is untrusted input: it is statically checked for
//! destructive statement keywords before touching the database. The
//! generated query only selects paper IDs; a fixed parameterized query
//! then expands those IDs into full joined records.

use regex::Regex;
use rusqlite::params_from_iter;
use scholia_common::MetadataRecord;
use std::sync::OnceLock;

use crate::error::{DbError, Result};
use crate::store::MetadataStore;

fn forbidden_tokens() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(DROP|DELETE|TRUNCATE|ALTER|UPDATE|INSERT|CREATE)\b|--").unwrap()
    })
}

/// Reject empty queries and anything containing destructive statement
/// keywords or SQL comment tokens.
pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(DbError::InvalidQuery("query string cannot be empty".to_string()));
    }
    if let Some(m) = forbidden_tokens().find(query) {
        return Err(DbError::UnsafeQuery(m.as_str().to_string()));
    }
    Ok(())
}

/// Fixed expansion query: paper IDs to full joined records, with a
/// grouped concatenation of author names in insertion order.
fn papers_query(id_count: usize) -> String {
    let placeholders = vec!["?"; id_count].join(", ");
    format!(
        "SELECT papers.title,
                journals.name,
                papers.publication_date,
                GROUP_CONCAT(authors.name, ', ' ORDER BY author_paper.position) AS authors,
                papers.paper_id,
                papers.url
         FROM papers
         LEFT JOIN author_paper ON papers.paper_id = author_paper.paper_id
         LEFT JOIN authors ON author_paper.author_id = authors.author_id
         LEFT JOIN journals ON papers.journal_id = journals.journal_id
         WHERE papers.paper_id IN ({placeholders})
         GROUP BY papers.paper_id, journals.name"
    )
}

impl MetadataStore {
    /// Run a validated, model-generated filter query. The first column
    /// of its result set is interpreted as paper IDs; those are expanded
    /// into full records. An empty filter result is an empty record
    /// list, not an error.
    pub fn run_metadata_query(&self, query: &str) -> Result<Vec<MetadataRecord>> {
        validate_query(query)?;
        tracing::debug!(query = %query.chars().take(120).collect::<String>(), "executing metadata query");

        let mut stmt = self.conn.prepare(query)?;
        let paper_ids = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        if paper_ids.is_empty() {
            tracing::warn!("metadata query returned no papers");
            return Ok(Vec::new());
        }
        self.records_for_paper_ids(&paper_ids)
    }

    /// Expand paper IDs into full joined records.
    pub fn records_for_paper_ids(&self, paper_ids: &[String]) -> Result<Vec<MetadataRecord>> {
        if paper_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&papers_query(paper_ids.len()))?;
        let records = stmt
            .query_map(params_from_iter(paper_ids.iter()), |r| {
                Ok(MetadataRecord {
                    title: r.get(0)?,
                    journal: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    publication_date: r.get(2)?,
                    authors: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    paper_id: r.get(4)?,
                    url: r.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}
