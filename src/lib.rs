//! Answers a fixed list of questions about one PDF with retrieval-augmented
//! generation: the PDF is split into page chunks, embedded into an in-memory
//! index, and queried through a conversational chain on a hosted chat model.

pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod testing;
