use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::{ports::DocumentLoader, DomainError};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("PDF not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read PDF {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to extract text from PDF {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("no extractable text in PDF {0}")]
    Empty(PathBuf),
}

impl From<DocumentError> for DomainError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(_) => DomainError::not_found(err.to_string()),
            DocumentError::Empty(_) => DomainError::validation(err.to_string()),
            _ => DomainError::internal(err.to_string()),
        }
    }
}

/// Extracts page text from a PDF with `pdf-extract`.
#[derive(Debug, Clone, Default)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    async fn read(path: &Path) -> Result<Vec<(usize, String)>, DocumentError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DocumentError::NotFound(path.to_path_buf())
            } else {
                DocumentError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        // pdf-extract can panic on malformed input; the blocking task turns
        // that into a join error instead of taking the process down.
        let extracted = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| e.to_string())
        .and_then(|result| result);

        let texts = extracted.map_err(|message| DocumentError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        let pages = number_pages(texts);
        if pages.is_empty() {
            return Err(DocumentError::Empty(path.to_path_buf()));
        }

        Ok(pages)
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load_pages(&self, path: &Path) -> Result<Vec<(usize, String)>, DomainError> {
        Ok(Self::read(path).await?)
    }
}

/// Numbers extracted pages from 1 in document order.
///
/// A blank page is dropped without shifting the pages after it.
pub fn number_pages(texts: Vec<String>) -> Vec<(usize, String)> {
    texts
        .into_iter()
        .enumerate()
        .filter_map(|(i, text)| {
            let text = text.trim();
            (!text.is_empty()).then(|| (i + 1, text.to_string()))
        })
        .collect()
}
