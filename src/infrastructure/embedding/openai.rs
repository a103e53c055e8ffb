use async_trait::async_trait;
use rig::client::EmbeddingsClient;
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::openai;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

/// OpenAI embeddings through `rig`.
pub struct TextEmbedding {
    client: openai::Client,
    model: String,
    dimension: usize,
}

impl TextEmbedding {
    pub fn from_config(api_key: &str, config: &EmbeddingConfig) -> Result<Self, DomainError> {
        let client = openai::Client::new(api_key)
            .map_err(|e| DomainError::internal(format!("Failed to build OpenAI client: {e}")))?;

        Ok(Self {
            client,
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl EmbeddingService for TextEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::internal("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.client.embedding_model(&self.model);

        let mut builder = EmbeddingsBuilder::new(model);
        for text in texts {
            builder = builder
                .document(text.to_string())
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        let embeddings = builder
            .build()
            .await
            .map_err(|e| DomainError::external(format!("embedding request failed: {e}")))?;

        if embeddings.len() != texts.len() {
            return Err(DomainError::external(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings
            .into_iter()
            .map(|(_doc, emb)| Embedding::from_f64(emb.first().vec))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
