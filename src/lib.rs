//! Ganj - retrieval and chat over the Ganj-e Hozour transcript archive
//!
//! Turns exported program transcripts into a searchable store and answers
//! Persian-language questions about them with program citations.
//!
//! # Overview
//!
//! Ganj allows you to:
//! - Chunk transcripts and embed the chunks in rate-limited batches
//! - Save everything as a single JSON vector store document
//! - Search semantically, or by keywords when embeddings are unavailable
//! - Answer chat messages from the retrieved excerpts, with a templated fallback
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `chunking` - Text cleaning and fixed-window chunking
//! - `embedding` - Embedding providers and the batch embedder
//! - `vector_store` - Document model and file-backed store
//! - `search` - Semantic and lexical ranking
//! - `ingest` - Transcript loading and document building
//! - `rag` - Chat orchestration
//!
//! # Example
//!
//! ```rust,no_run
//! use ganj::config::RagSettings;
//! use ganj::rag::{ChatRequest, RagEngine};
//! use ganj::search::SearchEngine;
//! use ganj::vector_store::JsonFileStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(JsonFileStore::new("rag-embeddings.json"));
//!     let engine = RagEngine::new(SearchEngine::new(store), RagSettings::default());
//!
//!     let response = engine.respond(&ChatRequest::new("عشق چیست؟")).await?;
//!     println!("{}", response.response);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod openai;
pub mod rag;
pub mod search;
pub mod vector_store;

pub use error::{GanjError, Result};
