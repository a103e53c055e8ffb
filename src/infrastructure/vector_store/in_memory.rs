use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{ports::VectorStore, DocumentChunk, DomainError, Embedding, SearchResult};

/// Brute-force cosine-similarity index held in memory for one run.
pub struct InMemoryVectorStore {
    chunks: RwLock<Vec<(DocumentChunk, Embedding)>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        chunk: &DocumentChunk,
        embedding: &Embedding,
    ) -> Result<(), DomainError> {
        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        if let Some((_, existing)) = store.first() {
            if existing.dimension() != embedding.dimension() {
                return Err(DomainError::validation(format!(
                    "embedding dimension {} does not match index dimension {}",
                    embedding.dimension(),
                    existing.dimension()
                )));
            }
        }

        match store.iter_mut().find(|(c, _)| c.id == chunk.id) {
            Some(entry) => *entry = (chunk.clone(), embedding.clone()),
            None => store.push((chunk.clone(), embedding.clone())),
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<SearchResult> = store
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        // Stable sort: equal scores keep insertion (page) order.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let store = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(store.len())
    }
}
