mod answer;
mod conversation;
mod document;
mod embedding;

pub use answer::{ChainResponse, QaRecord};
pub use conversation::{Conversation, Message, MessageRole};
pub use document::{chunk_pages, split_text, ChunkMetadata, Document, DocumentChunk, SearchResult};
pub use embedding::Embedding;
