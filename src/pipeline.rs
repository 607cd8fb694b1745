//! The resolution pipeline.
//!
//! Per request:
//!
//! ```text
//! credential check ──none──▶ MissingCredential
//!        │
//!        ▼
//! knowledge base ready? ──no──▶ prompt(NO_CONTEXT) ──▶ generate   (degraded)
//!        │ yes
//!        ▼
//! retrieve top-k ──▶ prompt(context) ──▶ generate                  (augmented)
//! ```
//!
//! [`ResolutionPipeline::generate_resolution`] is the caller-facing entry
//! point and always returns a string: the plan, or the error message.

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::credentials::CredentialChain;
use crate::embedding::provider_or_unavailable;
use crate::error::ResolutionError;
use crate::generation::{ChatCompletionsClient, GenerationClient};
use crate::knowledge::{KnowledgeBase, ResetOutcome};
use crate::models::RetrievedDocument;
use crate::prompt::{build_prompt, contains_placeholder, Prompt, NO_CONTEXT};
use crate::retriever::{join_context, Retriever};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPath {
    /// Answer grounded in retrieved precedent.
    Augmented,
    /// Knowledge base unavailable; answered without context.
    Degraded,
}

/// A successful resolution together with what produced it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub text: String,
    pub path: ResolutionPath,
    pub prompt: Prompt,
    pub retrieved: Vec<RetrievedDocument>,
}

pub struct ResolutionPipeline {
    credentials: CredentialChain,
    knowledge: Arc<KnowledgeBase>,
    generator: Arc<dyn GenerationClient>,
    top_k: usize,
}

impl ResolutionPipeline {
    pub fn new(
        credentials: CredentialChain,
        knowledge: Arc<KnowledgeBase>,
        generator: Arc<dyn GenerationClient>,
        top_k: usize,
    ) -> Self {
        Self {
            credentials,
            knowledge,
            generator,
            top_k,
        }
    }

    /// Wire up the default sources, embedder, and chat client from config.
    ///
    /// An embedder that cannot be set up does not stop the pipeline: the
    /// knowledge base reports itself unavailable and requests take the
    /// degraded path.
    pub fn from_config(config: &Config) -> Self {
        let knowledge = Arc::new(KnowledgeBase::new(
            config.store.persist_dir.clone(),
            provider_or_unavailable(&config.embedding),
        ));
        Self::new(
            CredentialChain::from_config(&config.credentials),
            knowledge,
            Arc::new(ChatCompletionsClient::new(&config.generation)),
            config.retrieval.top_k,
        )
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Produce a resolution plan for `complaint` in `category`.
    ///
    /// The complaint is expected to be non-empty; callers reject empty
    /// input before getting here.
    #[tracing::instrument(name = "resolve", skip_all, fields(category = %category))]
    pub async fn resolve(
        &self,
        complaint: &str,
        category: &str,
    ) -> Result<Resolution, ResolutionError> {
        let api_key = self
            .credentials
            .resolve()
            .ok_or(ResolutionError::MissingCredential)?;

        let (path, retrieved, context) = match self.retrieve(complaint).await {
            Ok(retrieved) => {
                let context = join_context(&retrieved);
                (ResolutionPath::Augmented, retrieved, context)
            }
            Err(e) => {
                tracing::warn!(error = %e, "retrieval unavailable, generating without context");
                (ResolutionPath::Degraded, Vec::new(), NO_CONTEXT.to_string())
            }
        };

        let prompt = build_prompt(category, &context, complaint);
        let text = self.generator.generate(&prompt, Some(api_key.as_str())).await?;

        if contains_placeholder(&text) {
            tracing::warn!("model output contains an unfilled placeholder");
        }
        tracing::info!(
            path = ?path,
            context_docs = retrieved.len(),
            model = self.generator.model_name(),
            "resolution generated"
        );

        Ok(Resolution {
            text,
            path,
            prompt,
            retrieved,
        })
    }

    /// Caller-facing entry point. Never fails: errors come back as their
    /// user-visible message.
    pub async fn generate_resolution(&self, complaint: &str, category: &str) -> String {
        match self.resolve(complaint, category).await {
            Ok(resolution) => resolution.text,
            Err(e) => e.to_string(),
        }
    }

    /// Retrieval only, for inspecting what a query would be grounded in.
    pub async fn search(&self, query: &str) -> Result<Vec<RetrievedDocument>, ResolutionError> {
        self.retrieve(query).await
    }

    pub async fn reset_knowledge(&self) -> Result<ResetOutcome> {
        self.knowledge.reset().await
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>, ResolutionError> {
        let store = self.knowledge.get_or_build().await?;
        Retriever::new(&store, self.knowledge.embedder(), self.top_k)
            .fetch(query)
            .await
            .map_err(|e| ResolutionError::RetrievalUnavailable(format!("{:#}", e)))
    }
}
