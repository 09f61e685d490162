use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use localrag_core::chunker::Chunker;
use localrag_core::config::RagConfig;
use localrag_core::error::{EmbeddingError, Error, Result};
use localrag_core::similarity::Metric;
use localrag_core::traits::EmbeddingProvider;
use localrag_core::types::{Fragment, FragmentId, PendingFragment, ScoredFragment, SourceDocument};
use localrag_embed::embed_with_timeout;

use crate::topk::top_k;

const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(10);

/// A fragment that could not be embedded during ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentFailure {
    pub sequence_index: usize,
    pub error: EmbeddingError,
}

/// Outcome of ingesting one document.
///
/// Fragments that embedded successfully are kept even when siblings failed;
/// `failures` lists the ones that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub source_id: String,
    pub added: Vec<FragmentId>,
    pub failures: Vec<FragmentFailure>,
}

impl IngestReport {
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Default)]
struct Store {
    /// Insertion order; the position doubles as the tie-break ordinal.
    fragments: Vec<Arc<Fragment>>,
    by_id: HashMap<FragmentId, usize>,
    /// Next id suffix. Only advanced under the write lock and never reset.
    next_seq: u64,
}

impl Store {
    fn insert(&mut self, pending: PendingFragment, embedding: Vec<f32>) -> FragmentId {
        let id = format!("{}_chunk_{}", pending.source, self.next_seq);
        self.next_seq += 1;
        self.by_id.insert(id.clone(), self.fragments.len());
        self.fragments.push(Arc::new(pending.into_fragment(id.clone(), embedding)));
        id
    }
}

/// In-memory corpus of embedded fragments with brute-force top-k search.
///
/// Searches share a read lock; ingestion takes the write lock only after all
/// embeddings for the document have been computed, so no lock is held across
/// a provider call.
pub struct RetrievalIndex {
    provider: Arc<dyn EmbeddingProvider>,
    chunker: Chunker,
    metric: Metric,
    embed_timeout: Duration,
    store: RwLock<Store>,
}

impl RetrievalIndex {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            chunker: Chunker::default(),
            metric: Metric::default(),
            embed_timeout: DEFAULT_EMBED_TIMEOUT,
            store: RwLock::new(Store::default()),
        }
    }

    pub fn from_config(config: &RagConfig, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(provider)
            .with_chunker(Chunker::new(config.chunking.clone()))
            .with_metric(config.retrieval.metric)
            .with_embed_timeout(config.embedding.timeout())
    }

    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn embed_timeout(&self) -> Duration {
        self.embed_timeout
    }

    /// Dimension every stored embedding has.
    pub fn dimension(&self) -> usize {
        self.provider.dim()
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.fragments.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.fragments.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Fragment>> {
        let store = self.store.read().await;
        store.by_id.get(id).map(|&pos| Arc::clone(&store.fragments[pos]))
    }

    /// Fragments of one source ordered by `sequence_index`.
    pub async fn fragments_for_source(&self, source: &str) -> Vec<Arc<Fragment>> {
        let store = self.store.read().await;
        let mut out: Vec<Arc<Fragment>> = store.fragments.iter().filter(|f| f.source == source).cloned().collect();
        out.sort_by_key(|f| f.sequence_index);
        out
    }

    /// Drop every fragment. Ids handed out before are never reissued.
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        store.fragments.clear();
        store.by_id.clear();
        info!(next_seq = store.next_seq, "index cleared");
    }

    /// Chunk, embed and store `document_text` under `source_id`.
    ///
    /// A document that chunks to nothing adds zero fragments and is not an
    /// error. Fragments whose embedding fails are reported in
    /// `IngestReport::failures`; the others are still stored.
    pub async fn ingest(&self, document_text: &str, source_id: &str) -> Result<IngestReport> {
        if source_id.trim().is_empty() {
            return Err(Error::InvalidInput("source id is empty".to_string()));
        }
        if self.dimension() == 0 {
            return Err(Error::InvalidConfig(format!("provider {} reports dimension 0", self.provider.id())));
        }

        let start = Instant::now();
        let pending = self.chunker.pending(document_text, source_id);
        if pending.is_empty() {
            debug!(source_id, "document has no fragments");
            return Ok(IngestReport { source_id: source_id.to_string(), added: vec![], failures: vec![] });
        }

        let provider = self.provider.as_ref();
        let embeddings = join_all(pending.iter().map(|p| embed_with_timeout(provider, &p.text, self.embed_timeout))).await;

        let mut ready = Vec::with_capacity(pending.len());
        let mut failures = Vec::new();
        for (fragment, result) in pending.into_iter().zip(embeddings) {
            match result {
                Ok(embedding) => ready.push((fragment, embedding)),
                Err(error) => {
                    warn!(source_id, sequence_index = fragment.sequence_index, %error, "fragment not embedded");
                    failures.push(FragmentFailure { sequence_index: fragment.sequence_index, error });
                }
            }
        }

        let added: Vec<FragmentId> = {
            let mut store = self.store.write().await;
            ready.into_iter().map(|(fragment, embedding)| store.insert(fragment, embedding)).collect()
        };

        info!(
            source_id,
            added = added.len(),
            failed = failures.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ingested document"
        );
        Ok(IngestReport { source_id: source_id.to_string(), added, failures })
    }

    /// Ingest documents one after another, in the given order.
    pub async fn ingest_documents(&self, documents: &[SourceDocument]) -> Result<Vec<IngestReport>> {
        let mut reports = Vec::with_capacity(documents.len());
        for doc in documents {
            reports.push(self.ingest(&doc.text, &doc.source_id).await?);
        }
        Ok(reports)
    }

    /// The `top_k` stored fragments most similar to `query_vector`, best first.
    ///
    /// Equal scores keep insertion order. An empty index or `top_k == 0`
    /// yields an empty result; a query of the wrong dimension is an error.
    pub async fn search(&self, query_vector: &[f32], top_k_limit: usize) -> Result<Vec<ScoredFragment>> {
        let store = self.store.read().await;
        if top_k_limit == 0 || store.fragments.is_empty() {
            return Ok(Vec::new());
        }
        if query_vector.len() != self.dimension() {
            return Err(Error::DimensionMismatch { expected: self.dimension(), actual: query_vector.len() });
        }

        let limit = top_k_limit.min(store.fragments.len());
        let metric = self.metric;
        let scores = store
            .fragments
            .iter()
            .enumerate()
            .map(|(ordinal, f)| (ordinal, metric.score(query_vector, &f.embedding)));
        let hits: Vec<ScoredFragment> = top_k(scores, limit)
            .into_iter()
            .map(|(ordinal, score)| ScoredFragment { fragment: Arc::clone(&store.fragments[ordinal]), score })
            .collect();

        debug!(corpus = store.fragments.len(), top_k = top_k_limit, returned = hits.len(), "searched index");
        Ok(hits)
    }
}
