use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::application::RagService;
use crate::domain::{
    ports::{ConversationalSession, LlmService},
    ChainResponse, Conversation, DomainError, SearchResult,
};
use crate::infrastructure::config::{
    PromptsConfig, CONTEXT_PLACEHOLDER, HISTORY_PLACEHOLDER, QUESTION_PLACEHOLDER,
};

/// Conversational retrieval over the vector index.
///
/// Follow-up questions are first rewritten into standalone questions using
/// the conversation so far, then answered from the retrieved chunks.
pub struct RetrievalChain {
    rag: Arc<RagService>,
    llm: Arc<dyn LlmService>,
    prompts: PromptsConfig,
    memory: Conversation,
}

/// Composes the retriever, the chat model and a fresh memory into a session.
pub fn build_chain(
    rag: Arc<RagService>,
    llm: Arc<dyn LlmService>,
    prompts: &PromptsConfig,
) -> Result<RetrievalChain, DomainError> {
    match RetrievalChain::new(rag, llm, prompts.clone()) {
        Ok(chain) => {
            info!(model = chain.llm.model(), "Conversational chain created successfully");
            Ok(chain)
        }
        Err(e) => {
            error!(error = %e, "Error creating conversation chain");
            Err(e)
        }
    }
}

impl RetrievalChain {
    pub fn new(
        rag: Arc<RagService>,
        llm: Arc<dyn LlmService>,
        prompts: PromptsConfig,
    ) -> Result<Self, DomainError> {
        if !prompts.answer.contains(CONTEXT_PLACEHOLDER) {
            return Err(DomainError::validation(
                "answer prompt is missing the {context} placeholder",
            ));
        }
        if !prompts.condense.contains(HISTORY_PLACEHOLDER)
            || !prompts.condense.contains(QUESTION_PLACEHOLDER)
        {
            return Err(DomainError::validation(
                "condense prompt needs {chat_history} and {question} placeholders",
            ));
        }

        Ok(Self {
            rag,
            llm,
            prompts,
            memory: Conversation::new(),
        })
    }

    pub fn memory(&self) -> &Conversation {
        &self.memory
    }

    async fn standalone_question(&self, question: &str) -> Result<String, DomainError> {
        if self.memory.is_empty() {
            return Ok(question.to_string());
        }

        let prompt = self
            .prompts
            .condense
            .replace(HISTORY_PLACEHOLDER, &self.memory.transcript())
            .replace(QUESTION_PLACEHOLDER, question);

        let rewritten = self.llm.complete(&prompt).await?;
        let rewritten = rewritten.trim();

        Ok(if rewritten.is_empty() {
            question.to_string()
        } else {
            rewritten.to_string()
        })
    }

    fn answer_prompt(&self, sources: &[SearchResult]) -> String {
        let context = sources
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        self.prompts.answer.replace(CONTEXT_PLACEHOLDER, &context)
    }
}

#[async_trait]
impl ConversationalSession for RetrievalChain {
    #[instrument(skip(self))]
    async fn ask(&mut self, question: &str) -> Result<ChainResponse, DomainError> {
        let standalone = self.standalone_question(question).await?;
        debug!(standalone = %standalone, "resolved question");

        let sources = self.rag.retrieve(&standalone).await?;
        let system = self.answer_prompt(&sources);
        let answer = self.llm.complete_with_system(&system, &standalone).await?;

        self.memory.record_turn(question, answer.clone());

        Ok(ChainResponse::with_answer(answer).with_sources(sources))
    }
}
