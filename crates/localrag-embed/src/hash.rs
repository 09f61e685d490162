//! Deterministic token-hash embeddings.
//!
//! Each normalised token is hashed with xxHash64 into one of `dim` buckets;
//! the bucket receives a weight derived from the upper hash bits. The result
//! is L2-normalised. Texts sharing words therefore score higher than
//! unrelated texts, which is enough for tests and offline development.

use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use twox_hash::XxHash64;

use localrag_core::error::EmbeddingError;
use localrag_core::similarity::magnitude;
use localrag_core::traits::EmbeddingProvider;

pub struct HashEmbedder {
    dim: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("hash:xxh64:d{dim}") }
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace().filter_map(normalize_token) {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            v[idx] += 0.5 + ((h >> 32) as u32 as f32) / (u32::MAX as f32);
        }
        let norm = magnitude(&v);
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }
}

/// Lowercase and strip surrounding punctuation; `None` for pure punctuation.
fn normalize_token(token: &str) -> Option<String> {
    let trimmed = token.trim_matches(|c: char| !c.is_alphanumeric());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_text(text)
    }
}
