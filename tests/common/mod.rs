#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use complaint_resolver::credentials::{CredentialChain, StaticSource};
use complaint_resolver::embedding::{EmbeddingProvider, HashProvider};
use complaint_resolver::error::ResolutionError;
use complaint_resolver::generation::GenerationClient;
use complaint_resolver::knowledge::KnowledgeBase;
use complaint_resolver::pipeline::ResolutionPipeline;
use complaint_resolver::prompt::Prompt;

/// Hash embedder that counts corpus builds (multi-text batches) and
/// single-text query embeddings separately.
pub struct CountingEmbedder {
    inner: HashProvider,
    pub corpus_embeds: AtomicUsize,
    pub query_embeds: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            inner: HashProvider::default(),
            corpus_embeds: AtomicUsize::new(0),
            query_embeds: AtomicUsize::new(0),
        }
    }

    pub fn corpus_embeds(&self) -> usize {
        self.corpus_embeds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
    fn dims(&self) -> usize {
        self.inner.dims()
    }
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.len() > 1 {
            self.corpus_embeds.fetch_add(1, Ordering::SeqCst);
        } else {
            self.query_embeds.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.embed(texts).await
    }
}

/// Embedder whose model never loads.
pub struct BrokenEmbedder;

#[async_trait]
impl EmbeddingProvider for BrokenEmbedder {
    fn model_name(&self) -> &str {
        "broken"
    }
    fn dims(&self) -> usize {
        384
    }
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        anyhow::bail!("Failed to initialize local embedding model: no network")
    }
}

/// What the mock model does with a prompt.
pub enum Reply {
    Fixed(String),
    /// Writes a plan that follows the instruction's numbered items.
    FollowInstruction,
    Fail(ResolutionError),
}

/// Generation client that records every prompt it is given.
pub struct RecordingModel {
    reply: Reply,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<Prompt>>,
}

impl RecordingModel {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Prompt {
        self.prompts.lock().unwrap().last().cloned().expect("no prompt recorded")
    }
}

#[async_trait]
impl GenerationClient for RecordingModel {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        api_key: Option<&str>,
    ) -> Result<String, ResolutionError> {
        if api_key.is_none() {
            return Err(ResolutionError::MissingCredential);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());

        match &self.reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Fail(err) => Err(err.clone()),
            Reply::FollowInstruction => {
                let steps: Vec<&str> = prompt
                    .system_instruction
                    .lines()
                    .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()))
                    .collect();
                Ok(format!(
                    "Resolution plan for {}.\n{}\nThe bank is required to investigate.",
                    prompt.category,
                    steps.join("\n")
                ))
            }
        }
    }
}

pub fn key(value: Option<&str>) -> CredentialChain {
    CredentialChain::new().with_source(StaticSource::new("test", value))
}

pub fn pipeline(
    dir: &Path,
    embedder: Arc<dyn EmbeddingProvider>,
    model: Arc<RecordingModel>,
    api_key: Option<&str>,
) -> ResolutionPipeline {
    let knowledge = Arc::new(KnowledgeBase::new(dir.join("index"), embedder));
    ResolutionPipeline::new(key(api_key), knowledge, model, 3)
}
