//! JSON sidecar metadata for parsed markdown files.
//!
//! The upstream PDF parser writes `paper.md` next to `paper.json`; the
//! sidecar carries everything the metadata store needs about the paper.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use scholia_common::PaperKey;
use scholia_db::papers::normalize_publication_date;
use scholia_db::PaperMetadata;

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperSidecar {
    /// External key, e.g. `doi:10.1000/xyz` or `arxiv:2104.12345`.
    pub paper_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    pub publication_date: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl PaperSidecar {
    /// Validates the sidecar into store-ready paper metadata.
    pub fn into_paper_metadata(self, file_path: &Path) -> Result<PaperMetadata> {
        let key = PaperKey::from_str(&self.paper_id)?;
        let publication_date = normalize_publication_date(&self.publication_date)?;
        Ok(PaperMetadata {
            key,
            title: self.title,
            authors: self.authors,
            journal: self.journal,
            publication_date,
            url: self.url,
            file_path: Some(file_path.display().to_string()),
        })
    }
}

/// Loads a markdown file and its sidecar.
pub fn load_document(md_path: &Path) -> Result<(String, PaperSidecar)> {
    let sidecar_path = md_path.with_extension("json");
    if !sidecar_path.exists() {
        return Err(IngestError::MissingSidecar(md_path.to_path_buf()));
    }

    let text = std::fs::read_to_string(md_path)?;
    let raw = std::fs::read_to_string(&sidecar_path)?;
    let sidecar: PaperSidecar = serde_json::from_str(&raw).map_err(|source| {
        IngestError::Sidecar {
            path: sidecar_path,
            source,
        }
    })?;
    debug!(path = %md_path.display(), paper_id = %sidecar.paper_id, "loaded document");
    Ok((text, sidecar))
}

/// Markdown files in a folder, sorted for deterministic ingestion
/// order.
pub fn markdown_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_pair(dir: &Path, stem: &str, json: &str) -> PathBuf {
        let md = dir.join(format!("{stem}.md"));
        std::fs::write(&md, "# Some Paper\n\nBody text.").unwrap();
        std::fs::write(dir.join(format!("{stem}.json")), json).unwrap();
        md
    }

    #[test]
    fn loads_markdown_with_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let md = write_pair(
            dir.path(),
            "paper",
            r#"{
                "paper_id": "doi:10.1000/xyz",
                "title": "A Paper",
                "authors": ["Ada Lovelace"],
                "journal": "J. Test",
                "publication_date": "2021-03"
            }"#,
        );

        let (text, sidecar) = load_document(&md).unwrap();
        assert!(text.starts_with("# Some Paper"));
        assert_eq!(sidecar.paper_id, "doi:10.1000/xyz");

        let meta = sidecar.into_paper_metadata(&md).unwrap();
        assert_eq!(meta.key.to_string(), "doi:10.1000/xyz");
        assert_eq!(meta.publication_date.to_string(), "2021-03-01");
    }

    #[test]
    fn missing_sidecar_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let md = dir.path().join("orphan.md");
        std::fs::write(&md, "text").unwrap();
        assert!(matches!(
            load_document(&md),
            Err(IngestError::MissingSidecar(_))
        ));
    }

    #[test]
    fn lists_markdown_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_pair(dir.path(), "b", "{}");
        write_pair(dir.path(), "a", "{}");
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = markdown_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }
}
