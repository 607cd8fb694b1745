//! Core data models used by the resolver.
//!
//! These types represent the precedent documents held by the knowledge
//! store and the ranked results handed from retrieval to prompt assembly.

/// Metadata attached to a knowledge document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Issue label, e.g. `"Debt is not yours (LABEL_7)"`.
    pub issue: String,
}

/// A precedent document: a past complaint and its resolution guidance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(issue: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata {
                issue: issue.into(),
            },
        }
    }
}

/// A document returned by the retriever.
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    pub document: Document,
    /// Zero-based position in the result list, most similar first.
    pub rank: usize,
    /// Cosine similarity to the query.
    pub score: f32,
}
