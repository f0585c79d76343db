//! Durable paper identifiers of the form `source-type:source-id`,
//! e.g. `doi:10.1038/nature12160` or `arxiv:2104.12345`.

use crate::error::ScholiaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Doi,
    Arxiv,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Doi => "doi",
            SourceKind::Arxiv => "arxiv",
        }
    }
}

/// A paper's external key. Stable across re-ingestion so duplicate
/// detection works; never an auto-increment row id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaperKey {
    pub source: SourceKind,
    pub id: String,
}

impl PaperKey {
    pub fn new(source: SourceKind, id: impl Into<String>) -> Self {
        Self { source, id: id.into() }
    }

    /// Journal key derived deterministically from the external key:
    /// the DOI prefix (registrant), or the literal `arXiv`.
    pub fn journal_key(&self) -> String {
        match self.source {
            SourceKind::Doi => self
                .id
                .split('/')
                .next()
                .unwrap_or(self.id.as_str())
                .to_string(),
            SourceKind::Arxiv => "arXiv".to_string(),
        }
    }
}

impl fmt::Display for PaperKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source.as_str(), self.id)
    }
}

impl FromStr for PaperKey {
    type Err = ScholiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| ScholiaError::InvalidPaperKey(s.to_string()))?;
        if id.is_empty() {
            return Err(ScholiaError::InvalidPaperKey(s.to_string()));
        }
        let source = match kind.to_ascii_lowercase().as_str() {
            "doi" => SourceKind::Doi,
            "arxiv" => SourceKind::Arxiv,
            _ => return Err(ScholiaError::InvalidPaperKey(s.to_string())),
        };
        Ok(Self { source, id: id.to_string() })
    }
}

impl TryFrom<String> for PaperKey {
    type Error = ScholiaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PaperKey> for String {
    fn from(k: PaperKey) -> Self {
        k.to_string()
    }
}
