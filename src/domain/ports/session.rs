use crate::domain::{errors::DomainError, ChainResponse};
use async_trait::async_trait;

/// A stateful question-answering session.
///
/// Each call may update the session's memory, so answers can depend on the
/// questions asked before them.
#[async_trait]
pub trait ConversationalSession: Send {
    async fn ask(&mut self, question: &str) -> Result<ChainResponse, DomainError>;
}
