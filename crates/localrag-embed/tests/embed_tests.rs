use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use localrag_core::config::{EmbeddingConfig, ProviderKind};
use localrag_core::error::{EmbeddingError, Error};
use localrag_core::similarity::cosine;
use localrag_core::traits::EmbeddingProvider;
use localrag_embed::{embed_with_timeout, get_default_provider, CachedProvider, HashEmbedder};

#[tokio::test]
async fn hash_embedder_shapes_and_determinism() -> anyhow::Result<()> {
    let embedder = HashEmbedder::new(256);
    let v1 = embedder.embed("hello world").await?;
    let v2 = embedder.embed("hello world").await?;

    assert_eq!(v1.len(), 256, "embedding dim is 256");
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    assert_eq!(v1, v2, "same text gives bit-identical vectors");
    Ok(())
}

#[tokio::test]
async fn hash_embedder_rewards_shared_words() -> anyhow::Result<()> {
    let embedder = HashEmbedder::new(1024);
    let query = embedder.embed("How do I start a campfire?").await?;
    let related = embedder.embed("To start a campfire, gather dry tinder.").await?;
    let unrelated = embedder.embed("Quarterly revenue grew by eleven percent.").await?;
    assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    Ok(())
}

#[tokio::test]
async fn hash_embedder_rejects_empty_text() {
    let embedder = HashEmbedder::new(8);
    assert_eq!(embedder.embed("").await, Err(EmbeddingError::EmptyInput));
    assert_eq!(embedder.embed(" \n\t").await, Err(EmbeddingError::EmptyInput));
}

struct CountingProvider {
    calls: AtomicUsize,
    dim: usize,
    fail: bool,
}

#[async_trait]
impl EmbeddingProvider for CountingProvider {
    fn id(&self) -> &str {
        "counting"
    }
    fn dim(&self) -> usize {
        self.dim
    }
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::Provider("model offline".to_string()));
        }
        Ok(vec![text.len() as f32; self.dim])
    }
}

#[tokio::test]
async fn cache_serves_repeats_without_calling_inner() -> anyhow::Result<()> {
    let inner = Arc::new(CountingProvider { calls: AtomicUsize::new(0), dim: 3, fail: false });
    let cached = CachedProvider::new(inner.clone());

    let a = cached.embed("alpha").await?;
    let b = cached.embed("alpha").await?;
    cached.embed("bravo!").await?;

    assert_eq!(a, b);
    assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    let stats = cached.stats().await;
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 2, 2));
    assert_eq!(cached.id(), "cached:counting");
    Ok(())
}

#[tokio::test]
async fn cache_does_not_store_failures() {
    let inner = Arc::new(CountingProvider { calls: AtomicUsize::new(0), dim: 3, fail: true });
    let cached = CachedProvider::new(inner.clone());
    assert!(cached.embed("alpha").await.is_err());
    assert!(cached.embed("alpha").await.is_err());
    assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cached.stats().await.entries, 0);
}

struct SlowProvider;

#[async_trait]
impl EmbeddingProvider for SlowProvider {
    fn id(&self) -> &str {
        "slow"
    }
    fn dim(&self) -> usize {
        2
    }
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(vec![1.0, 0.0])
    }
}

#[tokio::test]
async fn timeout_surfaces_as_retryable_error() {
    let err = embed_with_timeout(&SlowProvider, "text", Duration::from_millis(20)).await.unwrap_err();
    assert_eq!(err, EmbeddingError::Timeout(Duration::from_millis(20)));
    assert!(err.is_retryable());
}

struct WrongDimProvider;

#[async_trait]
impl EmbeddingProvider for WrongDimProvider {
    fn id(&self) -> &str {
        "wrong-dim"
    }
    fn dim(&self) -> usize {
        4
    }
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(vec![1.0, 2.0])
    }
}

#[tokio::test]
async fn dimension_is_checked_and_empty_text_short_circuits() {
    let err = embed_with_timeout(&WrongDimProvider, "text", Duration::from_secs(1)).await.unwrap_err();
    assert_eq!(err, EmbeddingError::DimensionMismatch { expected: 4, actual: 2 });

    let counting = CountingProvider { calls: AtomicUsize::new(0), dim: 1, fail: false };
    let err = embed_with_timeout(&counting, "   ", Duration::from_secs(1)).await.unwrap_err();
    assert_eq!(err, EmbeddingError::EmptyInput);
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_embedding_keeps_input_order() {
    let embedder = HashEmbedder::new(16);
    let texts = vec!["one".to_string(), String::new(), "three".to_string()];
    let out = embedder.embed_batch(&texts).await;
    assert_eq!(out.len(), 3);
    assert_eq!(out[0], embedder.embed("one").await);
    assert_eq!(out[1], Err(EmbeddingError::EmptyInput));
    assert_eq!(out[2], embedder.embed("three").await);
}

#[tokio::test]
async fn factory_builds_cached_hash_provider() {
    let config = EmbeddingConfig { dimension: 32, ..EmbeddingConfig::default() };
    let provider = get_default_provider(&config).expect("provider");
    assert_eq!(provider.dim(), 32);
    assert_eq!(provider.id(), "cached:hash:xxh64:d32");

    let uncached = get_default_provider(&EmbeddingConfig { cache: false, ..config }).expect("provider");
    assert_eq!(uncached.id(), "hash:xxh64:d32");
}

#[cfg(not(feature = "bge-m3"))]
#[test]
fn bge_m3_without_feature_is_a_config_error() {
    if std::env::var("APP_USE_FAKE_EMBEDDINGS").is_ok() {
        return;
    }
    let config = EmbeddingConfig { provider: ProviderKind::BgeM3, ..EmbeddingConfig::default() };
    assert!(matches!(get_default_provider(&config), Err(Error::InvalidConfig(_))));
}

#[tokio::test]
async fn concurrent_embeds_agree() {
    let embedder = Arc::new(HashEmbedder::new(64));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let e = embedder.clone();
            tokio::spawn(async move { e.embed("same text every time").await })
        })
        .collect();
    let results = futures::future::join_all(handles).await;
    let first = results[0].as_ref().expect("join").clone().expect("embed");
    for r in results {
        assert_eq!(r.expect("join").expect("embed"), first);
    }
}
