//! Aggregation of retrieval results into one context string.
//!
//! Sections render in a fixed order (metadata, content, general
//! knowledge). A section that did not run is omitted entirely; metadata
//! that ran but found nothing renders an explicit "No metadata results
//! found." line because the SQL path signals "ran but empty" with an
//! empty list while the content path simply yields no section.

use std::fmt::Write;

use scholia_common::models::{MetadataRecord, ParsedElements, ScoredSnippet, SearchResults};

use crate::error::{AgentError, Result};

const SEPARATOR_LENGTH: usize = 80;

pub const NO_METADATA_RESULTS: &str = "No metadata results found.";

/// One block per paper, field per line.
pub fn format_metadata_results(records: &[MetadataRecord]) -> String {
    if records.is_empty() {
        return NO_METADATA_RESULTS.to_string();
    }
    let mut out = String::new();
    for record in records {
        let _ = write!(
            out,
            "Title: {}\nAuthors: {}\nPublication Date: {}\nJournal: {}\nPaper ID: {}\n",
            record.title, record.authors, record.publication_date, record.journal, record.paper_id,
        );
    }
    out
}

/// One delimited excerpt per snippet, each introduced by a citation
/// sentence built from the metadata the snippet carries.
pub fn combine_snippets(snippets: &[ScoredSnippet]) -> String {
    let separator: String = "-".repeat(SEPARATOR_LENGTH);
    let mut out = vec![separator.clone()];
    for scored in snippets {
        let s = &scored.snippet;
        out.push(format!(
            "The following text is an excerpt of the article entitled '{}' \
             from author(s) {}. It was published in {} in (year-month-day) {}. \
             Paper ID: {}.\n\n<excerpt>",
            s.title, s.authors, s.journal, s.publication_date, s.paper_id,
        ));
        out.push(s.content.clone());
        out.push(format!("</excerpt>\n{separator}"));
    }
    out.push("End of excerpts.".to_string());
    out.join("\n")
}

/// Builds the aggregated context string.
///
/// Fails when a results section is populated but the sub-intent that
/// should have produced it is absent; the two must always travel
/// together.
pub fn aggregate_results(parsed: &ParsedElements, results: &SearchResults) -> Result<String> {
    let mut sections = Vec::new();

    if let Some(records) = &results.metadata {
        if records.is_empty() {
            sections.push(NO_METADATA_RESULTS.to_string());
        } else {
            let intent = parsed
                .metadata_search
                .as_deref()
                .ok_or(AgentError::ResultsWithoutIntent { section: "metadata" })?;
            sections.push(format!(
                "# This question required a metadata search: \"{intent}\"\n\
                 Here are the results:\n{}",
                format_metadata_results(records)
            ));
        }
    }

    if let Some(snippets) = &results.content {
        if !snippets.is_empty() {
            let intent = parsed
                .content_search
                .as_deref()
                .ok_or(AgentError::ResultsWithoutIntent { section: "content" })?;
            sections.push(format!(
                "# This question required content search for: {intent}\n\
                 Here are the results:\n{}\n",
                combine_snippets(snippets)
            ));
        }
    }

    if let Some(general) = &results.general {
        if !general.is_empty() {
            if parsed.general_knowledge.is_none() {
                return Err(AgentError::ResultsWithoutIntent { section: "general knowledge" });
            }
            sections.push(format!("# General knowledge required: {general}"));
        }
    }

    Ok(sections.join("\n"))
}
