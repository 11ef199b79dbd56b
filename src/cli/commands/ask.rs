//! Ask command implementation.

use super::rag_engine;
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::{AnswerKind, ChatRequest};
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(message: &str, settings: Settings) -> Result<()> {
    let engine = rag_engine(&settings)?;

    let spinner = Output::spinner("Searching transcripts...");
    let result = engine.respond(&ChatRequest::new(message)).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            println!("\n{}\n", response.format_for_display());
            if response.kind == AnswerKind::Fallback {
                Output::info("Answer built from search results only.");
            }
            Ok(())
        }
        Err(e) if e.is_invalid_input() => {
            Output::warning(&e.to_string());
            Err(e.into())
        }
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            Err(e.into())
        }
    }
}
