use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;
use std::time::Duration;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;

/// Hosted OpenAI chat model with a fixed sampling temperature.
pub struct OpenAiChat {
    client: openai::Client,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChat")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiChat {
    pub fn from_config(api_key: &str, config: &LlmConfig) -> Result<Self, DomainError> {
        let client = openai::Client::new(api_key)
            .map_err(|e| DomainError::internal(format!("Failed to build OpenAI client: {e}")))?;

        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    async fn run(&self, system: Option<&str>, prompt: &str) -> Result<String, DomainError> {
        let agent = match system {
            Some(system) => self
                .client
                .agent(&self.model)
                .preamble(system)
                .temperature(self.temperature)
                .build(),
            None => self
                .client
                .agent(&self.model)
                .temperature(self.temperature)
                .build(),
        };

        tokio::time::timeout(self.timeout, agent.prompt(prompt))
            .await
            .map_err(|_| DomainError::timeout("Chat completion timed out"))?
            .map_err(|e| DomainError::external(format!("Chat completion failed: {e}")))
    }
}

#[async_trait]
impl LlmService for OpenAiChat {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.run(None, prompt).await
    }

    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.run(Some(system), prompt).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
