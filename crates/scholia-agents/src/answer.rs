//! Final answering step.

use tracing::debug;

use scholia_llm::{CompletionBackend, Message};

use crate::error::Result;
use crate::prompts;

pub struct AnsweringAgent<B> {
    backend: B,
}

impl<B: CompletionBackend> AnsweringAgent<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Answers the question against the aggregated context.
    pub async fn answer(&self, question: &str, context: &str) -> Result<String> {
        let prompt = prompts::answer_prompt(question, context)?;
        debug!(context_len = context.len(), "requesting final answer");
        let response = self.backend.complete(vec![Message::user(prompt)]).await?;
        Ok(response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scholia_llm::LlmError;

    struct ScriptedBackend {
        reply: String,
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, messages: Vec<Message>) -> std::result::Result<String, LlmError> {
            assert_eq!(messages.len(), 1);
            Ok(self.reply.clone())
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn trims_the_model_reply() {
        let agent = AnsweringAgent::new(ScriptedBackend {
            reply: "  The answer.\n".to_string(),
        });
        let out = agent.answer("q", "ctx").await.unwrap();
        assert_eq!(out, "The answer.");
    }
}
