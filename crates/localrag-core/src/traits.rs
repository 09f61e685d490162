use async_trait::async_trait;

use crate::error::{EmbeddingError, GenerationError};

/// Maps text to a vector of fixed dimension.
///
/// Implementations must be deterministic: the same text always yields the
/// same vector, and every vector has length `dim()`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `hash:xxh64:d384`).
    fn id(&self) -> &str;

    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;

    /// Embed one text. Empty text fails with `EmbeddingError::EmptyInput`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts, one result per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Vec<Result<Vec<f32>, EmbeddingError>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await);
        }
        out
    }
}

/// Produces a natural-language answer from a composed prompt.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
