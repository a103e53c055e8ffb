mod document_loader;
mod embedding;
mod llm;
mod session;
mod vector_store;

pub use document_loader::DocumentLoader;
pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub use session::ConversationalSession;
pub use vector_store::VectorStore;
