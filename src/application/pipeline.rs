//! The four stages of a run, wired together.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::application::{build_chain, DocumentService, QuestionRunner, RagService};
use crate::domain::ports::{DocumentLoader, EmbeddingService, LlmService, VectorStore};
use crate::domain::{DomainError, QaRecord};
use crate::infrastructure::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadDocument,
    BuildIndex,
    BuildChain,
    AskQuestions,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadDocument => "loading PDF",
            Self::BuildIndex => "creating vectorstore",
            Self::BuildChain => "creating conversation chain",
            Self::AskQuestions => "answering questions",
        };
        f.write_str(name)
    }
}

/// A stage failure. The run stops at the first one.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: DomainError,
}

impl StageError {
    fn at(stage: Stage) -> impl FnOnce(DomainError) -> Self {
        move |source| Self { stage, source }
    }
}

/// The external services a run talks to.
pub struct Pipeline {
    pub loader: Arc<dyn DocumentLoader>,
    pub embedding: Arc<dyn EmbeddingService>,
    pub vector_store: Arc<dyn VectorStore>,
    pub llm: Arc<dyn LlmService>,
}

/// Load, index, build the chain, ask every configured question.
pub async fn run(
    pipeline: Pipeline,
    settings: &Settings,
    pdf_path: &Path,
) -> Result<Vec<QaRecord>, StageError> {
    let documents = DocumentService::new(pipeline.loader, &settings.chunking);
    let (_doc, chunks) = documents
        .load(pdf_path)
        .await
        .map_err(StageError::at(Stage::LoadDocument))?;

    let rag = Arc::new(RagService::new(
        pipeline.embedding,
        pipeline.vector_store,
        settings.rag.top_k,
    ));
    rag.build_index(&chunks)
        .await
        .map_err(StageError::at(Stage::BuildIndex))?;
    drop(chunks);

    let mut chain = build_chain(rag, pipeline.llm, &settings.prompts)
        .map_err(StageError::at(Stage::BuildChain))?;

    let records = QuestionRunner::new(&settings.answer)
        .ask_all(&mut chain, &settings.questions)
        .await
        .map_err(StageError::at(Stage::AskQuestions))?;

    info!(answers = records.len(), "Run complete");
    Ok(records)
}
