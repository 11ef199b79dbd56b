//! CLI command implementations.

mod ask;
mod config;
mod ingest;
mod program;
mod search;
mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use ingest::run_ingest;
pub use program::run_program;
pub use search::run_search;
pub use serve::{router, run_serve, AppState};

use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::openai::api_key_available;
use crate::rag::{OpenAIChatGenerator, RagEngine};
use crate::search::SearchEngine;
use crate::vector_store::JsonFileStore;
use std::sync::Arc;
use tracing::warn;

/// Load prompts honoring the configured custom directory and variables.
fn load_prompts(settings: &Settings) -> crate::Result<Prompts> {
    Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )
}

/// Search engine over the configured vector store file.
fn search_engine(settings: &Settings) -> SearchEngine {
    SearchEngine::new(Arc::new(JsonFileStore::new(settings.vector_store_path())))
}

/// Query embedder, when an API key is configured.
fn query_embedder(settings: &Settings) -> crate::Result<Option<Arc<dyn Embedder>>> {
    if !api_key_available() {
        return Ok(None);
    }
    let embedder = OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    )?;
    Ok(Some(Arc::new(embedder)))
}

/// RAG engine wired to the configured store and, when possible, OpenAI.
fn rag_engine(settings: &Settings) -> crate::Result<RagEngine> {
    let mut engine = RagEngine::new(search_engine(settings), settings.rag.clone())
        .with_prompts(load_prompts(settings)?);

    match query_embedder(settings)? {
        Some(embedder) => {
            engine = engine
                .with_embedder(embedder)
                .with_generator(Arc::new(OpenAIChatGenerator::new(&settings.rag)?));
        }
        None => warn!("OPENAI_API_KEY not set; answers use lexical search and templates"),
    }

    Ok(engine)
}
