//! Fixed-window document chunking.
//!
//! Splits each document into overlapping character windows. Deterministic:
//! re-chunking identical text with identical configuration produces an
//! identical ordered sequence of chunks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ingest::Document;

/// A bounded-length fragment of a source document, the unit of embedding and
/// retrieval. Carries its source document's metadata and its start offset
/// (in characters) within the original text. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    pub start_offset: usize,
}

/// Window configuration. Offsets and lengths are in characters, not bytes.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Splits one document into overlapping windows of at most `chunk_size`
/// characters, each starting `chunk_size - chunk_overlap` after the previous.
/// A document at or under the window size yields exactly one chunk.
pub fn split_document(document: &Document, config: &ChunkConfig) -> Vec<Chunk> {
    let chars: Vec<char> = document.text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    // Guards against a degenerate overlap >= size configuration.
    let step = config.chunk_size.saturating_sub(config.chunk_overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + config.chunk_size).min(chars.len());
        chunks.push(Chunk {
            text: chars[start..end].iter().collect(),
            metadata: document.metadata.clone(),
            start_offset: start,
        });
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Splits every document in order, preserving per-document chunk order.
pub fn split_documents(documents: &[Document], config: &ChunkConfig) -> Vec<Chunk> {
    documents
        .iter()
        .flat_map(|doc| split_document(doc, config))
        .collect()
}
