//! In-process vector index and similarity retriever.
//!
//! The index is built once at startup from all chunks (or a single
//! placeholder chunk when there are none), persisted to disk, and never
//! modified afterwards. Retrieval is brute-force cosine similarity over the
//! full row set, which stays tiny at this document count.

pub mod embeddings;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::ingest::chunker::Chunk;
use crate::ingest::Document;
use crate::retrieval::embeddings::{Embedder, EmbeddingError};

/// Number of chunks returned per retrieval.
const TOP_K: usize = 3;
/// Minimum cosine similarity a chunk must exceed to be returned.
const SCORE_THRESHOLD: f32 = 0.5;

const PLACEHOLDER_TEXT: &str = "No external data available.";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding call failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("failed to persist index: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IndexRow {
    chunk: Chunk,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    build_id: Uuid,
    embedding_model: String,
    rows: Vec<IndexRow>,
}

/// Immutable similarity index over embedded chunks.
pub struct VectorIndex {
    rows: Vec<IndexRow>,
}

impl VectorIndex {
    /// Embeds all chunks and persists the resulting rows under `index_dir`.
    /// When `chunks` is empty, indexes a single placeholder chunk instead so
    /// retrieval still has a well-formed (if useless) row set.
    ///
    /// Build failure is fatal to startup; there is no degraded path here.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: &dyn Embedder,
        index_dir: &Path,
    ) -> Result<Self, IndexError> {
        let chunks = if chunks.is_empty() {
            vec![placeholder_chunk()]
        } else {
            chunks
        };

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(IndexError::Embedding(EmbeddingError::CountMismatch {
                expected: chunks.len(),
                got: vectors.len(),
            }));
        }

        let rows: Vec<IndexRow> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, embedding)| IndexRow { chunk, embedding })
            .collect();

        let build_id = Uuid::new_v4();
        persist(index_dir, build_id, &rows)?;
        info!("Vector index built: {} rows (build {build_id})", rows.len());

        Ok(Self { rows })
    }
}

fn placeholder_chunk() -> Chunk {
    let document = Document::new(PLACEHOLDER_TEXT, "empty");
    Chunk {
        text: document.text,
        metadata: document.metadata,
        start_offset: 0,
    }
}

fn persist(index_dir: &Path, build_id: Uuid, rows: &[IndexRow]) -> Result<(), IndexError> {
    std::fs::create_dir_all(index_dir)?;
    let persisted = PersistedIndex {
        build_id,
        embedding_model: embeddings::EMBEDDING_MODEL.to_string(),
        rows: rows.to_vec(),
    };
    let path = index_dir.join(format!("index-{build_id}.json"));
    std::fs::write(&path, serde_json::to_vec(&persisted)?)?;
    Ok(())
}

/// A retrieval hit: the chunk plus its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Threshold-gated top-k similarity retriever over an immutable index.
pub struct Retriever {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    score_threshold: f32,
}

impl Retriever {
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            top_k: TOP_K,
            score_threshold: SCORE_THRESHOLD,
        }
    }

    /// Embeds the query and returns up to `top_k` chunks whose cosine
    /// similarity exceeds the threshold, highest first. Empty when nothing
    /// clears the threshold.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>, EmbeddingError> {
        let texts = [query.to_string()];
        let vectors = self.embedder.embed(&texts).await?;
        let query_vector = vectors.first().ok_or(EmbeddingError::CountMismatch {
            expected: 1,
            got: 0,
        })?;

        let mut hits: Vec<ScoredChunk> = self
            .index
            .rows
            .iter()
            .map(|row| ScoredChunk {
                chunk: row.chunk.clone(),
                score: cosine_similarity(query_vector, &row.embedding),
            })
            .filter(|hit| hit.score > self.score_threshold)
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(self.top_k);
        Ok(hits)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
