//! TOML configuration.
//!
//! Every section carries defaults, so a deployment without a config file
//! still gets a working resolver: Groq's OpenAI-compatible endpoint,
//! local MiniLM embeddings (or the hash embedder when fastembed is not
//! compiled in), and the `GROQ_API_KEY` credential chain.
//!
//! ```toml
//! [store]
//! persist_dir = "./banking_index"
//!
//! [embedding]
//! provider = "local"
//! model = "all-minilm-l6-v2"
//!
//! [retrieval]
//! top_k = 3
//!
//! [generation]
//! model = "llama-3.3-70b-versatile"
//! temperature = 0.1
//!
//! [credentials]
//! key_name = "GROQ_API_KEY"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Directory holding the persisted index. Its existence alone decides
    /// whether the knowledge store is loaded or rebuilt from the seed corpus.
    #[serde(default = "default_persist_dir")]
    pub persist_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persist_dir: default_persist_dir(),
        }
    }
}

fn default_persist_dir() -> PathBuf {
    PathBuf::from("./banking_index")
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            batch_size: default_batch_size(),
        }
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
fn default_provider() -> String {
    "local".to_string()
}
#[cfg(not(feature = "local-embeddings-fastembed"))]
fn default_provider() -> String {
    "hash".to_string()
}
fn default_batch_size() -> usize {
    64
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout. Unset means the HTTP client's own default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_generation_model(),
            temperature: default_temperature(),
            timeout_secs: None,
        }
    }
}

fn default_endpoint() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_generation_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}
fn default_temperature() -> f32 {
    0.1
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    /// Name looked up in the secrets file and the environment.
    #[serde(default = "default_key_name")]
    pub key_name: String,
    #[serde(default = "default_secrets_file")]
    pub secrets_file: PathBuf,
    #[serde(default = "default_key_file")]
    pub key_file: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            key_name: default_key_name(),
            secrets_file: default_secrets_file(),
            key_file: default_key_file(),
        }
    }
}

fn default_key_name() -> String {
    "GROQ_API_KEY".to_string()
}
fn default_secrets_file() -> PathBuf {
    PathBuf::from("./secrets.toml")
}
fn default_key_file() -> PathBuf {
    PathBuf::from("./GroqAPI_Key.txt")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` when it exists, otherwise fall back to [`Config::default`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

pub fn validate(config: &Config) -> Result<()> {
    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if !(0.0..=2.0).contains(&config.generation.temperature) {
        anyhow::bail!("generation.temperature must be in [0.0, 2.0]");
    }

    if config.generation.model.trim().is_empty() {
        anyhow::bail!("generation.model must not be empty");
    }

    if config.credentials.key_name.trim().is_empty() {
        anyhow::bail!("credentials.key_name must not be empty");
    }

    match config.embedding.provider.as_str() {
        "hash" | "local" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be hash or local.",
            other
        ),
    }

    if config.embedding.dims == Some(0) {
        anyhow::bail!("embedding.dims must be > 0");
    }

    Ok(())
}
