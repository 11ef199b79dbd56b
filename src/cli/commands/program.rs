//! Program command implementation.

use super::search_engine;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the program command.
pub async fn run_program(number: u32, settings: Settings) -> Result<()> {
    let engine = search_engine(&settings);
    let chunks = engine.chunks_by_program(number).await;

    if chunks.is_empty() {
        Output::warning(&format!("No chunks stored for program {}.", number));
        return Ok(());
    }

    let title = chunks
        .iter()
        .find_map(|c| c.title.clone())
        .unwrap_or_else(|| format!("Program {}", number));
    Output::header(&format!("#{} {}", number, title));
    Output::kv("Chunks", &chunks.len().to_string());

    for chunk in &chunks {
        Output::chunk(chunk);
    }

    Ok(())
}
