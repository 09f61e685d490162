//! Write-through embedding cache keyed by content hash.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use localrag_core::error::EmbeddingError;
use localrag_core::traits::EmbeddingProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoises another provider. Only successful embeddings are stored, so a
/// transient provider failure is retried on the next call.
pub struct CachedProvider {
    inner: Arc<dyn EmbeddingProvider>,
    id: String,
    entries: RwLock<HashMap<String, Arc<[f32]>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn EmbeddingProvider>) -> Self {
        let id = format!("cached:{}", inner.id());
        Self { inner, id, entries: RwLock::new(HashMap::new()), hits: AtomicU64::new(0), misses: AtomicU64::new(0) }
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().await.len(),
        }
    }

    fn content_hash(text: &str) -> String {
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }
}

#[async_trait]
impl EmbeddingProvider for CachedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let key = Self::content_hash(text);
        if let Some(v) = self.entries.read().await.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(hash = %key, "embedding cache hit");
            return Ok(v.to_vec());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let v = self.inner.embed(text).await?;
        self.entries.write().await.insert(key, Arc::from(v.as_slice()));
        Ok(v)
    }
}
