//! Startup ingestion: job-market document fetching and chunking.

pub mod chunker;
pub mod fetcher;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A source document produced by the fetcher (or as static fallback content).
/// Immutable once created; consumed by the chunker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// Creates a document tagged with a `source` metadata entry.
    pub fn new(text: impl Into<String>, source: &str) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), source.to_string());
        Self {
            text: text.into(),
            metadata,
        }
    }
}
