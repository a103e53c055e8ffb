use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    DocumentChunk, DomainError, SearchResult,
};

/// Owns the vector index: fills it once from the document chunks, then
/// answers similarity queries against it.
pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    default_top_k: usize,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            default_top_k,
        }
    }

    /// Embeds every chunk in one batch and stores it in the index.
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn build_index(&self, chunks: &[DocumentChunk]) -> Result<(), DomainError> {
        match self.index_chunks(chunks).await {
            Ok(()) => {
                info!("Vectorstore created successfully");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error creating vectorstore");
                Err(e)
            }
        }
    }

    async fn index_chunks(&self, chunks: &[DocumentChunk]) -> Result<(), DomainError> {
        if chunks.is_empty() {
            return Err(DomainError::validation("no chunks to index"));
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(DomainError::internal(format!(
                "embedding service returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            self.vector_store.upsert(chunk, embedding).await?;
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, DomainError> {
        self.retrieve_top_k(query, self.default_top_k).await
    }

    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        self.vector_store.search(&embedding, top_k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Embedding, ports::VectorStore};
    use crate::infrastructure::InMemoryVectorStore;
    use crate::testing::{FailingEmbedding, KeywordEmbedding};
    use async_trait::async_trait;
    use uuid::Uuid;

    fn chunks(texts: &[&str]) -> Vec<DocumentChunk> {
        let doc_id = Uuid::new_v4();
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| DocumentChunk::new(doc_id, *t, i))
            .collect()
    }

    #[tokio::test]
    async fn test_build_index_and_retrieve() {
        let store = Arc::new(InMemoryVectorStore::new());
        let rag = RagService::new(Arc::new(KeywordEmbedding), store.clone(), 2);

        rag.build_index(&chunks(&[
            "Acme is the company name",
            "Vacation: twenty days per year",
            "Termination requires two weeks notice",
        ]))
        .await
        .unwrap();

        assert_eq!(store.count().await.unwrap(), 3);

        let results = rag.retrieve("What is the vacation policy?").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "Vacation: twenty days per year");
    }

    #[tokio::test]
    async fn test_build_index_empty_chunks() {
        let rag = RagService::new(
            Arc::new(KeywordEmbedding),
            Arc::new(InMemoryVectorStore::new()),
            4,
        );
        let err = rag.build_index(&[]).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_build_index_propagates_embedding_failure() {
        let store = Arc::new(InMemoryVectorStore::new());
        let rag = RagService::new(Arc::new(FailingEmbedding), store.clone(), 4);

        let err = rag.build_index(&chunks(&["text"])).await.unwrap_err();

        assert!(matches!(err, DomainError::ExternalService(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    struct ShortEmbedding;

    #[async_trait]
    impl EmbeddingService for ShortEmbedding {
        async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
            Ok(Embedding::new(vec![1.0]))
        }

        async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            Ok(vec![Embedding::new(vec![1.0])])
        }

        fn dimension(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_build_index_rejects_count_mismatch() {
        let rag = RagService::new(
            Arc::new(ShortEmbedding),
            Arc::new(InMemoryVectorStore::new()),
            4,
        );
        let err = rag.build_index(&chunks(&["a", "b"])).await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
