//! # Complaint Resolver
//!
//! Retrieval-augmented resolution plans for banking complaints.
//!
//! A complaint arrives already classified into one of eleven credit
//! reporting issue categories. The resolver retrieves the closest
//! precedents from a small knowledge base, folds them into an instruction
//! for a chat model, and returns the model's resolution plan.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ Credentials │   │  Knowledge  │──▶│  Retriever   │
//! │ secrets/env │   │  seed/SQLite│   │  cosine top-k│
//! └──────┬──────┘   └─────────────┘   └──────┬───────┘
//!        │                                   ▼
//!        │          ┌─────────────┐   ┌──────────────┐
//!        └─────────▶│  Generation │◀──│    Prompt    │
//!                   │  chat model │   │  assembler   │
//!                   └─────────────┘   └──────────────┘
//! ```
//!
//! When the knowledge base cannot be built the pipeline still answers,
//! without retrieved context.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`categories`] | Classifier label mapping |
//! | [`corpus`] | Bundled seed corpus |
//! | [`models`] | Core data types |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`store`] | Knowledge store and persisted index |
//! | [`knowledge`] | Build-once knowledge store cache |
//! | [`retriever`] | Top-k semantic retrieval |
//! | [`credentials`] | API key resolution chain |
//! | [`prompt`] | Prompt assembly |
//! | [`generation`] | Chat model client |
//! | [`pipeline`] | End-to-end resolution |

pub mod categories;
pub mod config;
pub mod corpus;
pub mod credentials;
pub mod db;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod knowledge;
pub mod migrate;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod store;
