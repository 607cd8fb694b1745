//! The knowledge store: precedent documents plus their embeddings.
//!
//! A store is built once, either from the bundled seed corpus
//! ([`KnowledgeStore::build_from_seed`]) or from a persisted SQLite index
//! ([`KnowledgeStore::load`]), and is read-only afterwards. Nearest
//! neighbour lookup is a brute-force cosine scan, which is plenty for a
//! corpus this size.
//!
//! # Persisted layout
//!
//! `<persist_dir>/index.sqlite` with three tables:
//!
//! | Table | Contents |
//! |-------|----------|
//! | `documents` | `position`, `issue`, `content` |
//! | `embeddings` | `position`, little-endian f32 `vector`, `model`, `dims` |
//! | `meta` | `fingerprint`, `model`, `dims`, `created_at` |

use anyhow::{bail, Context, Result};
use sqlx::Row;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use crate::corpus::{corpus_fingerprint, seed_documents};
use crate::db;
use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, EmbeddingProvider};
use crate::migrate;
use crate::models::{Document, RetrievedDocument};

/// Where a store's contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOrigin {
    /// Loaded from the persisted index.
    Persistent,
    /// Embedded in-process from the seed corpus.
    Ephemeral,
}

#[derive(Debug)]
pub struct KnowledgeStore {
    documents: Vec<Document>,
    vectors: Vec<Vec<f32>>,
    model: String,
    dims: usize,
    origin: StoreOrigin,
}

impl KnowledgeStore {
    fn from_parts(
        documents: Vec<Document>,
        vectors: Vec<Vec<f32>>,
        model: String,
        dims: usize,
        origin: StoreOrigin,
    ) -> Result<Self> {
        if documents.len() != vectors.len() {
            bail!(
                "embedding count mismatch: {} documents, {} vectors",
                documents.len(),
                vectors.len()
            );
        }
        if let Some(bad) = vectors.iter().position(|v| v.len() != dims) {
            bail!(
                "vector {} has {} dims, expected {}",
                bad,
                vectors[bad].len(),
                dims
            );
        }
        Ok(Self {
            documents,
            vectors,
            model,
            dims,
            origin,
        })
    }

    /// Embed the bundled seed corpus into an ephemeral store.
    pub async fn build_from_seed(provider: &dyn EmbeddingProvider) -> Result<Self> {
        Self::build(seed_documents(), provider).await
    }

    /// Embed `documents` into an ephemeral store.
    pub async fn build(documents: Vec<Document>, provider: &dyn EmbeddingProvider) -> Result<Self> {
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = provider
            .embed(&texts)
            .await
            .context("Failed to embed knowledge documents")?;

        Self::from_parts(
            documents,
            vectors,
            provider.model_name().to_string(),
            provider.dims(),
            StoreOrigin::Ephemeral,
        )
    }

    /// Load the persisted index under `persist_dir`.
    ///
    /// The index must have been written with the same embedding model and
    /// dimensionality as `provider`, otherwise query vectors would not be
    /// comparable. It is not checked against the current seed corpus: a
    /// stale index is used as-is, with a warning.
    pub async fn load(persist_dir: &Path, provider: &dyn EmbeddingProvider) -> Result<Self> {
        let pool = db::connect(persist_dir, false)
            .await
            .with_context(|| format!("Failed to open index at {}", persist_dir.display()))?;

        let result = read_index(&pool, provider).await;
        pool.close().await;
        result
    }

    /// Write this store to `persist_dir`, replacing any previous index.
    pub async fn persist(&self, persist_dir: &Path) -> Result<()> {
        let pool = db::connect(persist_dir, true).await?;
        migrate::run_migrations(&pool).await?;

        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM embeddings").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM documents").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM meta").execute(&mut *tx).await?;

        for (position, (doc, vector)) in self.documents.iter().zip(&self.vectors).enumerate() {
            let position = position as i64;
            sqlx::query("INSERT INTO documents (position, issue, content) VALUES (?, ?, ?)")
                .bind(position)
                .bind(&doc.metadata.issue)
                .bind(&doc.content)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO embeddings (position, vector, model, dims) VALUES (?, ?, ?, ?)",
            )
            .bind(position)
            .bind(vec_to_blob(vector))
            .bind(&self.model)
            .bind(self.dims as i64)
            .execute(&mut *tx)
            .await?;
        }

        let meta = [
            ("fingerprint", corpus_fingerprint(&self.documents)),
            ("model", self.model.clone()),
            ("dims", self.dims.to_string()),
            ("created_at", chrono::Utc::now().to_rfc3339()),
        ];
        for (key, value) in meta {
            sqlx::query("INSERT INTO meta (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        pool.close().await;

        tracing::info!(
            dir = %persist_dir.display(),
            documents = self.documents.len(),
            model = %self.model,
            "persisted knowledge index"
        );
        Ok(())
    }

    /// The `k` documents most similar to `query_vec`, most similar first.
    /// Equal scores keep corpus insertion order.
    pub fn nearest(&self, query_vec: &[f32], k: usize) -> Vec<RetrievedDocument> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(query_vec, v)))
            .collect();

        // `sort_by` is stable, which gives the insertion-order tie-break.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(rank, (i, score))| RetrievedDocument {
                document: self.documents[i].clone(),
                rank,
                score,
            })
            .collect()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn origin(&self) -> StoreOrigin {
        self.origin
    }
}

async fn read_index(
    pool: &sqlx::SqlitePool,
    provider: &dyn EmbeddingProvider,
) -> Result<KnowledgeStore> {
    let entries: HashMap<String, String> = sqlx::query("SELECT key, value FROM meta")
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|r| (r.get::<String, _>("key"), r.get::<String, _>("value")))
        .collect();
    let meta = |name: &str| entries.get(name).cloned();

    let model = meta("model").ok_or_else(|| anyhow::anyhow!("index is missing model metadata"))?;
    let dims: usize = meta("dims")
        .ok_or_else(|| anyhow::anyhow!("index is missing dims metadata"))?
        .parse()
        .context("index dims metadata is not a number")?;

    if model != provider.model_name() || dims != provider.dims() {
        bail!(
            "index was built with {} ({} dims) but the active embedder is {} ({} dims)",
            model,
            dims,
            provider.model_name(),
            provider.dims()
        );
    }

    let rows = sqlx::query(
        "SELECT d.issue, d.content, e.vector FROM documents d \
         JOIN embeddings e ON e.position = d.position \
         ORDER BY d.position",
    )
    .fetch_all(pool)
    .await?;

    let mut documents = Vec::with_capacity(rows.len());
    let mut vectors = Vec::with_capacity(rows.len());
    for row in rows {
        documents.push(Document::new(
            row.get::<String, _>("issue"),
            row.get::<String, _>("content"),
        ));
        vectors.push(blob_to_vec(&row.get::<Vec<u8>, _>("vector")));
    }

    if documents.is_empty() {
        bail!("persisted index is empty");
    }

    let current = corpus_fingerprint(&seed_documents());
    if meta("fingerprint").as_deref() != Some(current.as_str()) {
        tracing::warn!(
            "persisted index was built from a different corpus than the bundled seed; using it as-is"
        );
    }

    KnowledgeStore::from_parts(documents, vectors, model, dims, StoreOrigin::Persistent)
}
