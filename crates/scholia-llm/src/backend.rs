//! Completion backend trait and concrete implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String, // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

// ── Trait ─────────────────────────────────────────────────────────────────────

/// A text-completion service: messages in, text out.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, LlmError>;
    fn model_id(&self) -> &str;
}

// Lets one backend instance be shared across the pipeline agents.
#[async_trait]
impl<T: CompletionBackend + ?Sized> CompletionBackend for std::sync::Arc<T> {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, LlmError> {
        (**self).complete(messages).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().await?;
    if status >= 400 {
        let msg = body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string();
        return Err(LlmError::ApiError { status, message: msg });
    }
    Ok(body)
}

fn openai_content(json: &serde_json::Value) -> String {
    json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("")
        .trim()
        .to_string()
}

// ── 1. Ollama (local) ─────────────────────────────────────────────────────────

pub struct OllamaBackend {
    pub base_url: String,
    pub model: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), model: model.into(), client: reqwest::Client::new() }
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model":       &self.model,
            "messages":    messages,
            "temperature": 0.0,
        });
        let resp = self.client.post(&url).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        Ok(openai_content(&json))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ── 2. OpenAI ─────────────────────────────────────────────────────────────────

pub struct OpenAiBackend {
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { model: model.into(), api_key: api_key.into(), client: reqwest::Client::new() }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model":       &self.model,
            "messages":    messages,
            "temperature": 0.0,
        });
        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;
        Ok(openai_content(&json))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ── 3. Anthropic ──────────────────────────────────────────────────────────────

pub struct AnthropicBackend {
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), client: reqwest::Client::new() }
    }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, LlmError> {
        // Messages API wants the system prompt split out.
        let system = messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let chat: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|m| serde_json::json!({"role": m.role, "content": m.content}))
            .collect();

        let mut body = serde_json::json!({
            "model":      &self.model,
            "messages":   chat,
            "max_tokens": 4096,
        });
        if !system.is_empty() {
            body["system"] = serde_json::Value::String(system);
        }

        let resp = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;

        let content = json["content"]
            .as_array()
            .and_then(|blocks| blocks.first())
            .and_then(|b| b["text"].as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        Ok(content)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
