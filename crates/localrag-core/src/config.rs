//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (nested keys separated by `__`, e.g.
//! `APP_EMBEDDING__TIMEOUT_MS=500`). Provides helpers to expand `~` and
//! `${VAR}` and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chunker::{Boundary, ChunkingConfig};
use crate::error::Error;
use crate::similarity::Metric;

pub const NO_CONTEXT_SENTINEL: &str = "[no relevant context found]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProviderKind {
    /// Deterministic token-hash embeddings; no model required.
    #[default]
    #[serde(rename = "hash")]
    Hash,
    /// Local BGE-M3 model (requires the `bge-m3` feature of `localrag-embed`).
    #[serde(rename = "bge-m3")]
    BgeM3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    pub dimension: usize,
    pub timeout_ms: u64,
    pub cache: bool,
    pub model_dir: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { provider: ProviderKind::Hash, dimension: 384, timeout_ms: 10_000, cache: true, model_dir: None }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `model_dir` with `~` and env vars expanded.
    pub fn model_path(&self) -> Option<PathBuf> {
        self.model_dir.as_deref().map(expand_path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_top_k: usize,
    pub metric: Metric,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_top_k: 4, metric: Metric::Cosine }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_context_chars: usize,
    pub generate_timeout_ms: u64,
    pub no_context_sentinel: String,
    pub block_delimiter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 4_000,
            generate_timeout_ms: 30_000,
            no_context_sentinel: NO_CONTEXT_SENTINEL.to_string(),
            block_delimiter: "\n\n".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn generate_timeout(&self) -> Duration {
        Duration::from_millis(self.generate_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DataConfig {
    pub docs_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RagConfig {
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub pipeline: PipelineConfig,
    pub data: DataConfig,
}

impl RagConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: &str| Error::InvalidConfig(msg.to_string());
        if self.embedding.dimension == 0 {
            return Err(invalid("embedding.dimension must be > 0"));
        }
        if self.embedding.timeout_ms == 0 {
            return Err(invalid("embedding.timeout_ms must be > 0"));
        }
        if self.pipeline.max_context_chars == 0 {
            return Err(invalid("pipeline.max_context_chars must be > 0"));
        }
        if self.pipeline.generate_timeout_ms == 0 {
            return Err(invalid("pipeline.generate_timeout_ms must be > 0"));
        }
        if !(0.0..1.0).contains(&self.chunking.overlap_percent) {
            return Err(invalid("chunking.overlap_percent must be in [0, 1)"));
        }
        if self.chunking.max_words == Some(0) {
            return Err(invalid("chunking.max_words must be > 0 when set"));
        }
        if matches!(&self.chunking.boundary, Boundary::Separator(s) if s.is_empty()) {
            return Err(invalid("chunking.boundary separator must not be empty"));
        }
        Ok(())
    }

    /// Docs directory resolved against `base`, if configured.
    pub fn docs_dir(&self, base: &Path) -> Option<PathBuf> {
        self.data.docs_dir.as_deref().map(|p| resolve_with_base(base, p))
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(RagConfig::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.rag()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The typed, validated configuration.
    pub fn rag(&self) -> anyhow::Result<RagConfig> {
        let rag: RagConfig = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to parse configuration: {}", e))?;
        rag.validate()?;
        Ok(rag)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
