use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::domain::{chunk_pages, ports::DocumentLoader, Document, DocumentChunk, DomainError};
use crate::infrastructure::config::ChunkingConfig;

pub struct DocumentService {
    loader: Arc<dyn DocumentLoader>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentService {
    pub fn new(loader: Arc<dyn DocumentLoader>, config: &ChunkingConfig) -> Self {
        Self {
            loader,
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }

    /// Loads a PDF and splits it into page-scoped chunks.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn load(&self, path: &Path) -> Result<(Document, Vec<DocumentChunk>), DomainError> {
        match self.load_inner(path).await {
            Ok((doc, chunks)) => {
                info!(
                    pages = doc.page_count,
                    chunks = chunks.len(),
                    "Loaded and split PDF"
                );
                Ok((doc, chunks))
            }
            Err(e) => {
                error!(error = %e, "Error loading PDF");
                Err(e)
            }
        }
    }

    async fn load_inner(&self, path: &Path) -> Result<(Document, Vec<DocumentChunk>), DomainError> {
        let pages = self.loader.load_pages(path).await?;
        let page_count = pages.iter().map(|(n, _)| *n).max().unwrap_or(0);

        let doc = Document::new(path.display().to_string()).with_page_count(page_count);
        let chunks = chunk_pages(&doc, &pages, self.chunk_size, self.chunk_overlap);

        if chunks.is_empty() {
            return Err(DomainError::validation(format!(
                "no extractable text in {}",
                doc.name
            )));
        }

        Ok((doc, chunks))
    }
}
