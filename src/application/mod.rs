//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete
//! implementations, so the whole question-answering flow can run against
//! test doubles.

pub mod pipeline;
pub mod services;

pub use pipeline::{run, Pipeline, Stage, StageError};
pub use services::{build_chain, DocumentService, QuestionRunner, RagService, RetrievalChain};
