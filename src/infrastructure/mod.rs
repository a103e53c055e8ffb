pub mod config;
pub mod embedding;
pub mod llm;
pub mod logging;
pub mod pdf;
pub mod vector_store;

pub use config::{Config, ConfigError, Settings};
pub use embedding::TextEmbedding;
pub use llm::OpenAiChat;
pub use pdf::{DocumentError, PdfLoader};
pub use vector_store::InMemoryVectorStore;
