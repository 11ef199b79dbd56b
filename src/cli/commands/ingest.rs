//! Ingest command implementation.

use super::load_prompts;
use crate::cli::preflight::{self, Operation};
use crate::cli::{IngestArgs, Output};
use crate::config::Settings;
use crate::embedding::{BatchMode, OpenAIEmbedder};
use crate::ingest::{IngestOptions, Ingestor};
use crate::openai::api_key_available;
use crate::vector_store::JsonFileStore;
use anyhow::Result;
use std::sync::Arc;

/// Fold command-line overrides into the loaded settings.
fn apply_overrides(settings: &mut Settings, args: &IngestArgs) {
    if let Some(size) = args.chunk_size {
        settings.chunking.chunk_size = size;
    }
    if let Some(overlap) = args.chunk_overlap {
        settings.chunking.chunk_overlap = overlap;
    }
    if let Some(batch_size) = args.batch_size {
        settings.embedding.batch_size = batch_size;
    }
    if args.strict {
        settings.embedding.mode = BatchMode::Strict;
    }
}

/// Run the ingest command.
pub async fn run_ingest(args: &IngestArgs, mut settings: Settings) -> Result<()> {
    apply_overrides(&mut settings, args);

    let input = Settings::expand_path(&args.input);
    let titles = args.titles.as_deref().map(Settings::expand_path);

    if let Err(e) = preflight::check(Operation::Ingest { input: &input }) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let embed = !args.no_embed && api_key_available();

    let output = args
        .output
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(|| settings.vector_store_path());
    let store = JsonFileStore::new(output);

    let prompts = load_prompts(&settings)?;
    let mut ingestor = Ingestor::new(&settings, &prompts);

    let progress = if embed {
        let embedder = OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        )?;
        let progress = Output::progress_bar(0, "Embedding batches");
        ingestor = ingestor
            .with_embedder(Arc::new(embedder))
            .with_progress(progress.clone());
        Some(progress)
    } else {
        if args.no_embed {
            Output::info("Skipping embeddings; the store will support keyword search only.");
        } else {
            Output::warning(
                "OPENAI_API_KEY not set; saving chunks without embeddings (keyword search only).",
            );
        }
        None
    };

    Output::info(&format!(
        "Chunking {} (chunk size {}, overlap {}, {} mode)",
        input.display(),
        settings.chunking.chunk_size,
        settings.chunking.chunk_overlap,
        settings.embedding.mode
    ));

    let options = IngestOptions {
        start: args.start,
        limit: args.limit,
    };
    let result = ingestor
        .run(&input, titles.as_deref(), &store, options)
        .await;

    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    };

    let document = &result.document;
    Output::success(&format!("Saved {}", store.path().display()));
    Output::kv("Transcripts used", &result.transcripts_used.to_string());
    Output::kv("Transcripts skipped", &result.transcripts_skipped.to_string());
    Output::kv("Chunks", &document.total_chunks.to_string());
    Output::kv(
        "Embedded chunks",
        &format!("{}/{}", document.embedded_count(), document.total_chunks),
    );
    Output::kv("Has embeddings", &document.has_embeddings.to_string());

    if let Some(report) = &result.embedding_report {
        for failure in &report.failures {
            Output::warning(&format!(
                "Batch {} ({}..{}, {} chunks) failed: {}",
                failure.batch_index + 1,
                failure.first_chunk_id,
                failure.last_chunk_id,
                failure.chunk_count,
                failure.error
            ));
        }
        if !report.is_complete() {
            Output::warning("Some chunks have no embedding; re-run ingestion to fill them in.");
        }
    }

    Ok(())
}
