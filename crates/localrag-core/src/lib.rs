#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! localrag-core
//!
//! Data model, error taxonomy, chunking, similarity and the collaborator
//! traits shared by the embedding, index and pipeline crates.

pub mod chunker;
pub mod config;
pub mod documents;
pub mod error;
pub mod logging;
pub mod similarity;
pub mod traits;
pub mod types;

pub use chunker::{Boundary, Chunker, ChunkingConfig};
pub use error::{EmbeddingError, Error, GenerationError, Result};
pub use similarity::Metric;
pub use traits::{AnswerGenerator, EmbeddingProvider};
pub use types::{Fragment, FragmentId, PendingFragment, ScoredFragment, SourceDocument};
