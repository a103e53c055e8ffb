use serde::{Deserialize, Serialize};

use super::SearchResult;

/// One line of the program's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
}

impl QaRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// What a conversational session hands back for a single question.
///
/// Both `answer` and `confidence_score` are optional: the question runner
/// substitutes a placeholder for a missing answer and treats a missing score
/// as full confidence.
#[derive(Debug, Clone, Default)]
pub struct ChainResponse {
    pub answer: Option<String>,
    pub confidence_score: Option<f64>,
    pub source_documents: Vec<SearchResult>,
}

impl ChainResponse {
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            ..Self::default()
        }
    }

    pub fn with_confidence(mut self, score: f64) -> Self {
        self.confidence_score = Some(score);
        self
    }

    pub fn with_sources(mut self, sources: Vec<SearchResult>) -> Self {
        self.source_documents = sources;
        self
    }
}
