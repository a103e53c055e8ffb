use std::path::Path;

use crate::domain::errors::DomainError;
use async_trait::async_trait;

/// Extracts per-page text from a document on disk.
///
/// Returns `(page_number, text)` pairs in page order with 1-based numbers.
/// Blank pages may be omitted, so numbers can skip.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load_pages(&self, path: &Path) -> Result<Vec<(usize, String)>, DomainError>;
}
