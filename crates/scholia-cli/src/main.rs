//! Scholia — question answering over a personal library of scientific papers.
//! Entry point for the CLI binary.

mod config;
mod pipeline;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scholia_llm::{AnthropicBackend, CompletionBackend, OllamaBackend, OpenAiBackend};

#[derive(Parser)]
#[command(name = "scholia", version, about = "Ask questions about your paper library")]
struct Cli {
    /// Ingest a folder of parsed markdown documents (with JSON metadata
    /// sidecars) instead of answering a question.
    #[arg(long, value_name = "FOLDER")]
    parse: Option<PathBuf>,

    /// Collection to scope the question against; defaults to all papers.
    #[arg(long)]
    collection: Option<String>,
}

fn build_backend(cfg: &config::LlmConfig) -> anyhow::Result<Arc<dyn CompletionBackend>> {
    match cfg.backend.as_str() {
        "ollama" => Ok(Arc::new(OllamaBackend::new(
            cfg.base_url.clone(),
            cfg.model.clone(),
        ))),
        "openai" => {
            let key = std::env::var(&cfg.api_key_env)
                .with_context(|| format!("OpenAI backend needs {} set", cfg.api_key_env))?;
            Ok(Arc::new(OpenAiBackend::new(key, cfg.model.clone())))
        }
        "anthropic" => {
            let key = std::env::var(&cfg.api_key_env)
                .with_context(|| format!("Anthropic backend needs {} set", cfg.api_key_env))?;
            Ok(Arc::new(AnthropicBackend::new(key, cfg.model.clone())))
        }
        other => anyhow::bail!("unknown llm backend {other:?} (expected ollama, openai or anthropic)"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scholia=info,warn")),
        )
        .init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::Config::load()?;
    info!(backend = %config.llm.backend, model = %config.llm.model, "scholia starting");

    if let Some(folder) = cli.parse {
        pipeline::ingest_folder(&config, &folder).await?;
        return Ok(());
    }

    let backend = build_backend(&config.llm)?;
    if let Err(err) = pipeline::question_cycle(&config, cli.collection.as_deref(), backend).await {
        // A bad question or a flaky upstream should not look like a
        // crash; report it and exit cleanly.
        println!("\n{err:#}");
    }
    Ok(())
}
