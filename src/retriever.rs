//! Semantic retrieval over a [`KnowledgeStore`].

use anyhow::Result;

use crate::embedding::{embed_query, EmbeddingProvider};
use crate::models::RetrievedDocument;
use crate::store::KnowledgeStore;

/// Borrows a built store and the embedder that built it. Never mutates
/// the store.
pub struct Retriever<'a> {
    store: &'a KnowledgeStore,
    embedder: &'a dyn EmbeddingProvider,
    k: usize,
}

impl<'a> Retriever<'a> {
    pub fn new(store: &'a KnowledgeStore, embedder: &'a dyn EmbeddingProvider, k: usize) -> Self {
        Self { store, embedder, k }
    }

    /// Up to `k` documents ranked by similarity to `query`.
    pub async fn fetch(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        let query_vec = embed_query(self.embedder, query).await?;
        let hits = self.store.nearest(&query_vec, self.k);
        tracing::debug!(
            hits = hits.len(),
            top = hits.first().map(|h| h.document.metadata.issue.as_str()).unwrap_or("-"),
            "retrieved context"
        );
        Ok(hits)
    }
}

/// Concatenate retrieved contents, separated by a blank line.
pub fn join_context(results: &[RetrievedDocument]) -> String {
    results
        .iter()
        .map(|r| r.document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SEED_CORPUS;
    use crate::embedding::HashProvider;

    #[tokio::test]
    async fn test_fetch_respects_k() {
        let provider = HashProvider::default();
        let store = KnowledgeStore::build_from_seed(&provider).await.unwrap();

        let hits = Retriever::new(&store, &provider, 3)
            .fetch("collection agency calling about a medical bill")
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(
            hits.iter().map(|h| h.rank).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(hits[0].score >= hits[1].score && hits[1].score >= hits[2].score);

        let all = Retriever::new(&store, &provider, 50).fetch("x").await.unwrap();
        assert_eq!(all.len(), 11);
    }

    #[tokio::test]
    async fn test_identical_query_is_top_hit() {
        let provider = HashProvider::default();
        let store = KnowledgeStore::build_from_seed(&provider).await.unwrap();
        let (issue, content) = SEED_CORPUS[7];

        let hits = Retriever::new(&store, &provider, 3)
            .fetch(content)
            .await
            .unwrap();
        assert_eq!(hits[0].document.metadata.issue, issue);
        assert_eq!(hits[0].rank, 0);
    }

    #[tokio::test]
    async fn test_join_context() {
        let provider = HashProvider::default();
        let store = KnowledgeStore::build_from_seed(&provider).await.unwrap();
        let hits = store.nearest(&vec![0.0; provider.dims()], 2);
        let joined = join_context(&hits);
        assert_eq!(
            joined,
            format!("{}\n\n{}", SEED_CORPUS[0].1, SEED_CORPUS[1].1)
        );
        assert_eq!(join_context(&[]), "");
    }
}
