mod chain;
mod document;
mod questions;
mod rag;

pub use chain::{build_chain, RetrievalChain};
pub use document::DocumentService;
pub use questions::QuestionRunner;
pub use rag::RagService;
