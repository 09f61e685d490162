//! Domain types shared by the chunker, the index and the query pipeline.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type FragmentId = String;

/// Raw text handed over by a document source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub source_id: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source_id: source_id.into(), text: text.into() }
    }
}

/// A chunk that has not been embedded yet and therefore has no id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFragment {
    pub source: String,
    pub text: String,
    pub sequence_index: usize,
}

impl PendingFragment {
    /// Attach an id and an embedding, producing the immutable stored form.
    pub fn into_fragment(self, id: FragmentId, embedding: Vec<f32>) -> Fragment {
        Fragment {
            id,
            text: self.text,
            source: self.source,
            sequence_index: self.sequence_index,
            embedding,
        }
    }
}

/// An embedded unit of retrievable knowledge.
///
/// - `id`: `{source}_chunk_{n}`, never reused within an index
/// - `text`: trimmed, non-empty fragment content
/// - `source`: originating document id
/// - `sequence_index`: position in the source's chunk sequence
/// - `embedding`: fixed-length vector, set once at ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: FragmentId,
    pub text: String,
    pub source: String,
    pub sequence_index: usize,
    pub embedding: Vec<f32>,
}

/// A search result: the stored fragment and its similarity to the query.
///
/// `score` is metric-specific but higher is always better.
#[derive(Debug, Clone)]
pub struct ScoredFragment {
    pub fragment: Arc<Fragment>,
    pub score: f32,
}
