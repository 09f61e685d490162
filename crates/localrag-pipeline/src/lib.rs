//! localrag-pipeline
//!
//! Turns a user question into a grounded answer: embeds the question, pulls
//! the nearest fragments from a [`RetrievalIndex`](localrag_index::RetrievalIndex),
//! assembles a bounded context block and hands the composed prompt to an
//! [`AnswerGenerator`](localrag_core::traits::AnswerGenerator).

pub mod context;
pub mod generator;
mod pipeline;

pub use generator::{ExtractiveGenerator, DECLINE_ANSWER};
pub use pipeline::{GroundedAnswer, QueryPipeline};
