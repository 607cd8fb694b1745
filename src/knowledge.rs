//! Process-wide, build-once cache of the [`KnowledgeStore`].
//!
//! Building is expensive (model load plus embedding), so it happens at
//! most once until [`KnowledgeBase::reset`] is called. Build and reset
//! take the same lock: concurrent first callers wait for the one build in
//! flight and share its result, and a reset never observes a half-built
//! store.
//!
//! A failed build is remembered as well. Until the next reset every
//! caller sees the knowledge base as unavailable and takes the degraded
//! path without retrying the build.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::embedding::EmbeddingProvider;
use crate::error::ResolutionError;
use crate::store::KnowledgeStore;

enum Slot {
    Empty,
    Ready(Arc<KnowledgeStore>),
    Unavailable(String),
}

/// What [`KnowledgeBase::reset`] actually cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The persisted index was deleted (and any cached store dropped).
    Cleared,
    /// No index on disk; only the in-process cache was dropped.
    CacheOnly,
    /// Nothing was cached and nothing was on disk.
    NothingToClear,
}

pub struct KnowledgeBase {
    persist_dir: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    slot: Mutex<Slot>,
    builds: AtomicUsize,
}

impl KnowledgeBase {
    pub fn new(persist_dir: impl Into<PathBuf>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            persist_dir: persist_dir.into(),
            embedder,
            slot: Mutex::new(Slot::Empty),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn persist_dir(&self) -> &Path {
        &self.persist_dir
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Number of builds performed so far, successful or not.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Return the cached store, building it on first use.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::RetrievalUnavailable`] when the build failed,
    /// now or on an earlier call since the last reset.
    pub async fn get_or_build(&self) -> Result<Arc<KnowledgeStore>, ResolutionError> {
        let mut slot = self.slot.lock().await;

        match &*slot {
            Slot::Ready(store) => return Ok(store.clone()),
            Slot::Unavailable(reason) => {
                return Err(ResolutionError::RetrievalUnavailable(reason.clone()))
            }
            Slot::Empty => {}
        }

        self.builds.fetch_add(1, Ordering::SeqCst);
        match self.build().await {
            Ok(store) => {
                let store = Arc::new(store);
                *slot = Slot::Ready(store.clone());
                Ok(store)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::error!(error = %reason, "failed to build knowledge base");
                *slot = Slot::Unavailable(reason.clone());
                Err(ResolutionError::RetrievalUnavailable(reason))
            }
        }
    }

    async fn build(&self) -> Result<KnowledgeStore> {
        if self.persist_dir.exists() {
            tracing::info!(dir = %self.persist_dir.display(), "loading persisted knowledge index");
            KnowledgeStore::load(&self.persist_dir, self.embedder.as_ref()).await
        } else {
            tracing::warn!(
                dir = %self.persist_dir.display(),
                "persisted index not found, building in-memory knowledge base from seed corpus"
            );
            KnowledgeStore::build_from_seed(self.embedder.as_ref()).await
        }
    }

    /// Drop the cached store and delete the persisted index, if any.
    ///
    /// The cache is dropped even when deleting the index fails; the error
    /// is returned so the caller can report it.
    pub async fn reset(&self) -> Result<ResetOutcome> {
        let mut slot = self.slot.lock().await;
        let had_cache = !matches!(*slot, Slot::Empty);
        *slot = Slot::Empty;

        if self.persist_dir.exists() {
            tokio::fs::remove_dir_all(&self.persist_dir)
                .await
                .with_context(|| {
                    format!("Error deleting index at {}", self.persist_dir.display())
                })?;
            tracing::info!(dir = %self.persist_dir.display(), "persisted index deleted");
            Ok(ResetOutcome::Cleared)
        } else if had_cache {
            Ok(ResetOutcome::CacheOnly)
        } else {
            Ok(ResetOutcome::NothingToClear)
        }
    }

    /// Embed the seed corpus and write it to the persist directory.
    ///
    /// Holds the build lock so no build reads the index mid-write. The
    /// cached store, if any, is left alone; call [`reset`](Self::reset)
    /// first to pick up the new index in this process.
    pub async fn persist_seed(&self) -> Result<usize> {
        let _guard = self.slot.lock().await;
        let store = KnowledgeStore::build_from_seed(self.embedder.as_ref()).await?;
        store.persist(&self.persist_dir).await?;
        Ok(store.len())
    }
}
