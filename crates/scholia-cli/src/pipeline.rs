//! The interactive question/answer cycle and the ingestion entry point.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use scholia_agents::{aggregate_results, AnsweringAgent, MetadataAgent, QuestionDecomposer};
use scholia_common::models::{ParsedElements, SearchResults};
use scholia_db::MetadataStore;
use scholia_ingestion::IngestionPipeline;
use scholia_llm::CompletionBackend;
use scholia_vector::{ContentSearch, FastembedReranker, QdrantStore};

use crate::config::Config;

fn prompt(text: &str) -> io::Result<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn display_parsed(parsed: &ParsedElements) {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "None".to_string());
    println!(
        "Parsed elements:\n\
         Metadata search: {}\n\
         Content search: {}\n\
         General knowledge: {}\n",
        show(&parsed.metadata_search),
        show(&parsed.content_search),
        show(&parsed.general_knowledge),
    );
}

/// Lets the user override each sub-intent before retrieval runs.
fn review_parsed(mut parsed: ParsedElements) -> io::Result<ParsedElements> {
    loop {
        let answer = prompt("Do you want to make any changes to the parsed elements? (y/[n]) ")?;
        match answer.to_lowercase().as_str() {
            "y" => {
                for (name, field) in [
                    ("metadata search", &mut parsed.metadata_search),
                    ("content search", &mut parsed.content_search),
                    ("general knowledge", &mut parsed.general_knowledge),
                ] {
                    let current = field.clone().unwrap_or_else(|| "None".to_string());
                    let change = prompt(&format!(
                        "Modify '{name}'? (current value: '{current}') (y/[n]) "
                    ))?;
                    if change.to_lowercase() == "y" {
                        let value = prompt(&format!("Enter new value for '{name}': "))?;
                        *field = if value.is_empty() || value.to_lowercase().starts_with("none") {
                            None
                        } else {
                            Some(value)
                        };
                    }
                }
                display_parsed(&parsed);
            }
            "n" | "" => break,
            _ => println!("Invalid input. Please enter 'y' or 'n'."),
        }
    }
    Ok(parsed)
}

/// Runs one question through decompose, retrieval, aggregate, answer.
pub async fn question_cycle(
    config: &Config,
    collection: Option<&str>,
    backend: Arc<dyn CompletionBackend>,
) -> anyhow::Result<()> {
    let question = prompt("Please enter your question: ")?;
    if question.is_empty() {
        println!("No question given.");
        return Ok(());
    }

    let decomposer = QuestionDecomposer::new(backend.clone());
    print!("Parsing question...  ");
    io::stdout().flush()?;
    let parsed = decomposer.decompose(&question).await?;
    println!("done.");
    display_parsed(&parsed);
    let parsed = review_parsed(parsed)?;

    let mut store = MetadataStore::open(&config.database.path)
        .with_context(|| format!("opening metadata store at {}", config.database.path))?;
    let collection_id = match collection {
        Some(name) => store
            .get_collection_id(name)?
            .with_context(|| format!("collection {name:?} does not exist"))?,
        None => store.all_papers_collection()?,
    };

    let mut results = SearchResults::default();

    if let Some(intent) = &parsed.metadata_search {
        print!("Searching metadata...  ");
        io::stdout().flush()?;
        let agent = MetadataAgent::new(backend.clone());
        let records = agent.fetch_metadata(intent, &store, collection_id).await?;
        println!("done ({} papers).", records.len());
        results.metadata = Some(records);
    }

    if let Some(intent) = &parsed.content_search {
        print!("Searching content...  ");
        io::stdout().flush()?;
        let vector_store =
            QdrantStore::connect(&config.vector.url, &config.vector.collection).await?;
        let reranker = FastembedReranker::new()?;
        let search =
            ContentSearch::new(vector_store, reranker).with_fetch_k(config.search.fetch_k);

        // When the metadata step ran, content search is scoped to
        // exactly the papers it returned.
        let restriction: Option<Vec<String>> = results
            .metadata
            .as_ref()
            .map(|records| records.iter().map(|r| r.paper_id.clone()).collect());
        let snippets = search
            .search(intent, config.search.top_k, restriction.as_deref())
            .await?;
        println!("done ({} snippets).", snippets.len());
        results.content = Some(snippets);
    }

    results.general = parsed.general_knowledge.clone();

    let context = aggregate_results(&parsed, &results)?;
    info!(context_len = context.len(), "aggregated retrieval context");

    print!("Answering question...  ");
    io::stdout().flush()?;
    let answerer = AnsweringAgent::new(backend);
    let answer = answerer.answer(&question, &context).await?;
    println!("done.");

    println!("\n{}", "-".repeat(70));
    println!("\nAnswer: {answer}");
    Ok(())
}

/// Ingests a folder of parsed markdown documents.
pub async fn ingest_folder(config: &Config, folder: &Path) -> anyhow::Result<()> {
    let mut store = MetadataStore::open(&config.database.path)
        .with_context(|| format!("opening metadata store at {}", config.database.path))?;
    let vector_store =
        QdrantStore::connect(&config.vector.url, &config.vector.collection).await?;

    let mut pipeline = IngestionPipeline::new(&mut store, &vector_store);
    let report = pipeline.ingest_folder(folder).await?;

    println!(
        "Ingested {} papers ({} duplicates skipped, {} failures).",
        report.ingested, report.duplicates, report.failures
    );
    Ok(())
}
