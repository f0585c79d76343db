//! scholia-llm — text-completion backends.
//!
//! One trait, three concrete backends:
//!   OllamaBackend    — local Ollama (OpenAI-compatible chat endpoint)
//!   OpenAiBackend    — OpenAI API
//!   AnthropicBackend — Anthropic Messages API
//!
//! All three agents (question decomposition, text-to-SQL, answering)
//! speak through [`CompletionBackend`]; tests substitute a scripted
//! double. Non-2xx responses are terminal for
//! the calling pipeline stage; retries are the caller's business.

pub mod backend;

pub use backend::{
    AnthropicBackend, CompletionBackend, LlmError, Message, OllamaBackend, OpenAiBackend,
};
