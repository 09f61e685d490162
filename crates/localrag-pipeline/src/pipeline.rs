use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use localrag_core::config::{PipelineConfig, RagConfig};
use localrag_core::error::{Error, GenerationError, Result};
use localrag_core::traits::AnswerGenerator;
use localrag_core::types::ScoredFragment;
use localrag_embed::embed_with_timeout;
use localrag_index::RetrievalIndex;

use crate::context::{build_context, compose_prompt};

/// Generator output plus what it was grounded on.
#[derive(Debug, Clone)]
pub struct GroundedAnswer {
    /// Generator output, verbatim.
    pub text: String,
    /// Hits that made it into the context block, best first.
    pub sources: Vec<ScoredFragment>,
    pub prompt: String,
}

/// Question → embed → search → context → prompt → generator.
///
/// Holds a shared handle to the index and only reads from it, so a call can
/// be dropped at any await point without affecting the corpus.
pub struct QueryPipeline {
    index: Arc<RetrievalIndex>,
    generator: Arc<dyn AnswerGenerator>,
    config: PipelineConfig,
}

impl QueryPipeline {
    pub fn new(index: Arc<RetrievalIndex>, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { index, generator, config: PipelineConfig::default() }
    }

    pub fn from_config(config: &RagConfig, index: Arc<RetrievalIndex>, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { index, generator, config: config.pipeline.clone() }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn index(&self) -> &Arc<RetrievalIndex> {
        &self.index
    }

    /// Answer `user_query` from the `top_k` most similar fragments.
    pub async fn answer(&self, user_query: &str, top_k: usize) -> Result<String> {
        Ok(self.answer_detailed(user_query, top_k).await?.text)
    }

    pub async fn answer_detailed(&self, user_query: &str, top_k: usize) -> Result<GroundedAnswer> {
        let query = user_query.trim();
        if query.is_empty() {
            return Err(Error::InvalidQuery("query is empty".to_string()));
        }
        let start = Instant::now();

        let provider = self.index.provider();
        let query_vector = embed_with_timeout(provider.as_ref(), query, self.index.embed_timeout()).await?;
        let mut hits = self.index.search(&query_vector, top_k).await?;

        let context = build_context(
            &hits,
            &self.config.block_delimiter,
            self.config.max_context_chars,
            &self.config.no_context_sentinel,
        );
        hits.truncate(context.fragments_used);
        debug!(hits = hits.len(), truncated = context.truncated, chars = context.text.len(), "built context");

        let prompt = compose_prompt(&context.text, query);
        let timeout = self.config.generate_timeout();
        let text = tokio::time::timeout(timeout, self.generator.generate(&prompt))
            .await
            .map_err(|_| GenerationError::Timeout(timeout))??;

        info!(top_k, sources = hits.len(), elapsed_ms = start.elapsed().as_millis() as u64, "answered query");
        Ok(GroundedAnswer { text, sources: hits, prompt })
    }
}
