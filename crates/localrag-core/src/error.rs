use std::time::Duration;

use thiserror::Error;

/// Failure to turn a piece of text into a vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyInput,

    #[error("embedding provider failed: {0}")]
    Provider(String),

    #[error("embedding provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("embedding has dimension {actual}, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbeddingError {
    /// Transient provider faults may succeed on a later attempt; bad input never will.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Timeout(_))
    }
}

/// Failure reported by the answer generator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("answer generation failed: {0}")]
    Failed(String),

    #[error("answer generator did not answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Query vector has dimension {actual}, index holds dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
