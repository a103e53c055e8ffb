use tracing::{error, info, instrument, warn};

use crate::domain::{ports::ConversationalSession, ChainResponse, DomainError, QaRecord};
use crate::infrastructure::config::AnswerConfig;

/// Score assumed when a session does not report one.
const FULL_CONFIDENCE: f64 = 1.0;

/// Runs a fixed question list through a session and gates weak answers.
#[derive(Debug, Clone)]
pub struct QuestionRunner {
    placeholder: String,
    confidence_threshold: f64,
}

impl QuestionRunner {
    pub fn new(config: &AnswerConfig) -> Self {
        Self {
            placeholder: config.placeholder.clone(),
            confidence_threshold: config.confidence_threshold,
        }
    }

    /// Asks every question in order. The first failure aborts the batch.
    #[instrument(skip_all, fields(count = questions.len()))]
    pub async fn ask_all(
        &self,
        session: &mut dyn ConversationalSession,
        questions: &[String],
    ) -> Result<Vec<QaRecord>, DomainError> {
        let mut records = Vec::with_capacity(questions.len());

        for question in questions {
            let response = session.ask(question).await.map_err(|e| {
                error!(question = %question, error = %e, "Error answering question");
                e
            })?;

            let answer = self.resolve_answer(response);
            info!(question = %question, "Answered question");
            records.push(QaRecord::new(question.clone(), answer));
        }

        Ok(records)
    }

    /// Picks the text to report for one response.
    ///
    /// A missing answer and a score below the threshold both yield the
    /// placeholder.
    pub fn resolve_answer(&self, response: ChainResponse) -> String {
        let confidence = response.confidence_score.unwrap_or(FULL_CONFIDENCE);
        if confidence < self.confidence_threshold {
            warn!(confidence, "Answer below confidence threshold");
            return self.placeholder.clone();
        }

        response.answer.unwrap_or_else(|| self.placeholder.clone())
    }

    /// Renders records as a JSON array indented by two spaces.
    pub fn to_json(records: &[QaRecord]) -> Result<String, DomainError> {
        serde_json::to_string_pretty(records)
            .map_err(|e| DomainError::internal(format!("failed to serialize answers: {e}")))
    }
}

impl Default for QuestionRunner {
    fn default() -> Self {
        Self::new(&AnswerConfig::default())
    }
}
