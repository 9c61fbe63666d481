use async_trait::async_trait;
use rig::{agent::Agent, completion::Prompt, prelude::*, providers::openrouter};
use tracing::debug;

use crate::reply::REPLY_PREAMBLE;

/// External text generation used for customer replies.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// [`ReplyGenerator`] backed by an OpenRouter-hosted chat model.
pub struct OpenRouterReplyGenerator {
    agent: Agent<openrouter::CompletionModel>,
    model: String,
}

impl OpenRouterReplyGenerator {
    pub fn new(api_key: &str, model: &str) -> Self {
        let client = openrouter::Client::new(api_key);
        let agent = client.agent(model).preamble(REPLY_PREAMBLE).build();
        Self {
            agent,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ReplyGenerator for OpenRouterReplyGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting generated reply");
        let response = self.agent.prompt(prompt).await?;
        Ok(response)
    }
}
