//! Search command implementation.

use super::{query_embedder, search_engine};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::Embedder;
use anyhow::Result;
use tracing::warn;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, lexical: bool, settings: Settings) -> Result<()> {
    let engine = search_engine(&settings);

    let spinner = Output::spinner("Searching...");

    let embedding = if lexical {
        None
    } else {
        match query_embedder(&settings)? {
            Some(embedder) => match embedder.embed(query).await {
                Ok(embedding) => Some(embedding),
                Err(e) => {
                    warn!("Query embedding failed, using keyword search: {}", e);
                    None
                }
            },
            None => None,
        }
    };

    let hits = engine.search(query, embedding.as_deref(), limit).await;
    spinner.finish_and_clear();

    if hits.is_empty() {
        Output::warning("No results found matching your query.");
        return Ok(());
    }

    Output::success(&format!("Found {} results", hits.len()));
    for hit in &hits {
        Output::search_hit(hit);
    }

    Ok(())
}
