//! Configuration loading for Scholia.
//! Reads scholia.toml from the current directory or path in SCHOLIA_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub vector: VectorConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String { "scholia.db".to_string() }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    #[serde(default = "default_qdrant_url")]
    pub url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_qdrant_url() -> String { "http://localhost:6334".to_string() }
fn default_collection() -> String { "scholia_chunks".to_string() }

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            url: default_qdrant_url(),
            collection: default_collection(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" | "openai" | "anthropic"
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Environment variable to read the API key from.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_backend()     -> String { "ollama".to_string() }
fn default_model()       -> String { "llama3:8b".to_string() }
fn default_ollama_url()  -> String { "http://localhost:11434".to_string() }
fn default_api_key_env() -> String { "SCHOLIA_API_KEY".to_string() }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model: default_model(),
            base_url: default_ollama_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,
}

fn default_top_k()   -> usize { 5 }
fn default_fetch_k() -> usize { 100 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            fetch_k: default_fetch_k(),
        }
    }
}


impl Config {
    /// Load configuration from scholia.toml.
    /// Checks SCHOLIA_CONFIG env var first, then the current directory;
    /// a missing file falls back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("SCHOLIA_CONFIG")
            .unwrap_or_else(|_| "scholia.toml".to_string());

        if !Path::new(&path).exists() {
            tracing::info!("no config file at {path}, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
