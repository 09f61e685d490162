//! localrag-index
//!
//! The in-memory retrieval index: ingestion (chunk → embed → store) and
//! brute-force top-k similarity search over the stored fragments.

mod index;
pub mod topk;

pub use index::{FragmentFailure, IngestReport, RetrievalIndex};
