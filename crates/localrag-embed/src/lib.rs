//! localrag-embed
//!
//! Embedding providers for the retrieval index and query pipeline:
//! deterministic `HashEmbedder`, the content-hash `CachedProvider` wrapper and,
//! with the `bge-m3` feature, a local BGE-M3 model.
//!
//! Respects `APP_USE_FAKE_EMBEDDINGS=1` to force the hash provider regardless
//! of configuration.

pub mod cache;
pub mod hash;
#[cfg(feature = "bge-m3")]
pub mod model;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use localrag_core::config::{EmbeddingConfig, ProviderKind};
use localrag_core::error::{EmbeddingError, Error};
use localrag_core::traits::EmbeddingProvider;

pub use cache::{CacheStats, CachedProvider};
pub use hash::HashEmbedder;

/// Embed `text`, failing with `EmbeddingError::Timeout` if the provider takes
/// longer than `timeout`, and checking the returned dimension.
pub async fn embed_with_timeout(
    provider: &dyn EmbeddingProvider,
    text: &str,
    timeout: Duration,
) -> Result<Vec<f32>, EmbeddingError> {
    if text.trim().is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }
    let v = tokio::time::timeout(timeout, provider.embed(text))
        .await
        .map_err(|_| EmbeddingError::Timeout(timeout))??;
    if v.len() != provider.dim() {
        return Err(EmbeddingError::DimensionMismatch { expected: provider.dim(), actual: v.len() });
    }
    Ok(v)
}

/// Build the provider described by `config`, wrapped in a cache when enabled.
pub fn get_default_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, Error> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

    let base: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::BgeM3 if !use_fake => bge_m3_provider(config)?,
        _ => Arc::new(HashEmbedder::new(config.dimension)),
    };
    info!(provider = base.id(), dim = base.dim(), cache = config.cache, "embedding provider ready");

    if config.cache {
        Ok(Arc::new(CachedProvider::new(base)))
    } else {
        Ok(base)
    }
}

#[cfg(feature = "bge-m3")]
fn bge_m3_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, Error> {
    if config.dimension != model::BGE_M3_DIM {
        tracing::warn!(configured = config.dimension, actual = model::BGE_M3_DIM, "embedding.dimension ignored for bge-m3");
    }
    let embedder = model::BgeM3Embedder::new(config.model_path())
        .map_err(|e| EmbeddingError::Provider(format!("failed to load BGE-M3: {e}")))?;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "bge-m3"))]
fn bge_m3_provider(_config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, Error> {
    Err(Error::InvalidConfig(
        "embedding.provider = \"bge-m3\" requires localrag-embed built with the `bge-m3` feature".to_string(),
    ))
}
