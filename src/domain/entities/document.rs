use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separators tried in order when a page is too long for one chunk.
/// The empty separator falls back to splitting between characters.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub page_count: usize,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            content_type: "application/pdf".to_string(),
            page_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = page_count;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(document_id: Uuid, content: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content: content.into(),
            chunk_index,
            metadata: ChunkMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// 1-based page the text was extracted from.
    pub page: Option<usize>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Turns extracted pages into chunks.
///
/// Every page yields at least one chunk; pages longer than `chunk_size`
/// characters are broken up by [`split_text`]. Chunk indices run from 0
/// across the whole document and every chunk remembers its page.
pub fn chunk_pages(
    document: &Document,
    pages: &[(usize, String)],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();

    for (page, text) in pages {
        for piece in split_text(text, chunk_size, chunk_overlap) {
            let metadata = ChunkMetadata {
                page: Some(*page),
                source: Some(document.name.clone()),
            };
            let index = chunks.len();
            chunks.push(DocumentChunk::new(document.id, piece, index).with_metadata(metadata));
        }
    }

    chunks
}

/// Splits `text` into pieces of at most `chunk_size` characters.
///
/// Paragraph breaks are preferred, then line breaks, then spaces, and only
/// as a last resort arbitrary character positions. Consecutive pieces share
/// up to `chunk_overlap` characters of trailing context.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }

    split_recursive(text, &SEPARATORS, chunk_size, chunk_overlap)
}

fn split_recursive(
    text: &str,
    separators: &[&str],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<String> {
    let position = separators
        .iter()
        .position(|sep| sep.is_empty() || text.contains(sep))
        .unwrap_or(separators.len().saturating_sub(1));
    let separator = separators.get(position).copied().unwrap_or("");
    let finer = separators.get(position + 1..).unwrap_or(&[]);

    let pieces: Vec<&str> = if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split(separator).collect()
    };

    let mut chunks = Vec::new();
    let mut fitting: Vec<&str> = Vec::new();

    for piece in pieces {
        if char_len(piece) <= chunk_size {
            fitting.push(piece);
            continue;
        }

        if !fitting.is_empty() {
            chunks.extend(merge_pieces(&fitting, separator, chunk_size, chunk_overlap));
            fitting.clear();
        }

        if finer.is_empty() {
            chunks.push(piece.trim().to_string());
        } else {
            chunks.extend(split_recursive(piece, finer, chunk_size, chunk_overlap));
        }
    }

    if !fitting.is_empty() {
        chunks.extend(merge_pieces(&fitting, separator, chunk_size, chunk_overlap));
    }

    chunks.retain(|c| !c.is_empty());
    chunks
}

/// Greedily packs pieces into chunks, carrying a tail of at most
/// `chunk_overlap` characters into the next chunk.
fn merge_pieces(
    pieces: &[&str],
    separator: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut total = 0;

    for &piece in pieces {
        let len = char_len(piece);
        let joiner = if window.is_empty() { 0 } else { separator_len };

        if total + len + joiner > chunk_size && !window.is_empty() {
            push_joined(&mut chunks, &window, separator);

            while total > chunk_overlap
                || (total > 0 && total + len + separator_len > chunk_size)
            {
                let Some(first) = window.pop_front() else {
                    break;
                };
                total -= char_len(first);
                if !window.is_empty() {
                    total -= separator_len;
                }
            }
        }

        if !window.is_empty() {
            total += separator_len;
        }
        window.push_back(piece);
        total += len;
    }

    push_joined(&mut chunks, &window, separator);
    chunks
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let joined = joined.trim();
    if !joined.is_empty() {
        chunks.push(joined.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
