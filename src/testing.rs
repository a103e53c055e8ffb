//! Deterministic stand-ins for the domain ports, shared by unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use crate::domain::ports::{ConversationalSession, DocumentLoader, EmbeddingService, LlmService};
use crate::domain::{ChainResponse, DomainError, Embedding};

const VOCABULARY: [&str; 6] = ["company", "ceo", "vacation", "termination", "acme", "jane"];

/// Embeds text as keyword counts over a tiny vocabulary.
pub struct KeywordEmbedding;

impl KeywordEmbedding {
    fn vectorize(text: &str) -> Embedding {
        let lower = text.to_lowercase();
        let mut vec: Vec<f32> = VOCABULARY
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect();
        // Keeps texts without any keyword off the zero vector.
        vec.push(0.1);
        Embedding::new(vec)
    }
}

#[async_trait]
impl EmbeddingService for KeywordEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        Ok(Self::vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        VOCABULARY.len() + 1
    }
}

/// Embedding service whose every call fails.
pub struct FailingEmbedding;

#[async_trait]
impl EmbeddingService for FailingEmbedding {
    async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
        Err(DomainError::external("invalid api key"))
    }

    async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Err(DomainError::external("invalid api key"))
    }

    fn dimension(&self) -> usize {
        0
    }
}

/// A recorded chat model call: optional system prompt and user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmCall {
    pub system: Option<String>,
    pub prompt: String,
}

/// Chat model that replays canned replies in order and records its calls.
/// Runs out of replies with an external-service error.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<LlmCall>>,
}

impl ScriptedLlm {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<LlmCall> {
        self.calls.lock().unwrap().clone()
    }

    fn reply(&self, system: Option<&str>, prompt: &str) -> Result<String, DomainError> {
        self.calls.lock().unwrap().push(LlmCall {
            system: system.map(str::to_string),
            prompt: prompt.to_string(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DomainError::external("no scripted reply left"))
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.reply(None, prompt)
    }

    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.reply(Some(system), prompt)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Session that hands out prepared responses, one per question.
pub struct ScriptedSession {
    responses: VecDeque<Result<ChainResponse, DomainError>>,
    pub asked: Vec<String>,
}

impl ScriptedSession {
    pub fn new(responses: Vec<Result<ChainResponse, DomainError>>) -> Self {
        Self {
            responses: responses.into(),
            asked: Vec::new(),
        }
    }
}

#[async_trait]
impl ConversationalSession for ScriptedSession {
    async fn ask(&mut self, question: &str) -> Result<ChainResponse, DomainError> {
        self.asked.push(question.to_string());
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::internal("no scripted response left")))
    }
}

/// Loader returning fixed pages regardless of path.
pub struct StaticLoader {
    pages: Vec<(usize, String)>,
}

impl StaticLoader {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages
                .iter()
                .enumerate()
                .map(|(i, text)| (i + 1, text.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load_pages(&self, _path: &Path) -> Result<Vec<(usize, String)>, DomainError> {
        Ok(self.pages.clone())
    }
}
