//! Ingestion pipeline: transcripts in, vector store document out.
//!
//! Every run regenerates the full chunk set and re-embeds everything, then
//! replaces the stored document. Nothing is updated incrementally.

mod transcript;

pub use transcript::{ProgramTitles, Transcript, TranscriptId, TranscriptSet};

use crate::chunking::{ChunkingConfig, TextChunker};
use crate::config::{ChunkingSettings, EmbeddingSettings, LabelPrompts, Prompts, Settings};
use crate::embedding::{BatchReport, Embedder, EmbeddingBatcher};
use crate::error::Result;
use crate::vector_store::{Chunk, JsonFileStore, VectorStoreDocument};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Which slice of the input to process.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Index of the first transcript to process.
    pub start: usize,
    /// Maximum number of transcripts to process.
    pub limit: Option<usize>,
}

/// Chunks produced from a transcript set.
#[derive(Debug, Clone, Default)]
pub struct ChunkedTranscripts {
    pub chunks: Vec<Chunk>,
    /// Transcripts that produced at least one chunk.
    pub used: usize,
    /// Transcripts skipped as empty or too short.
    pub skipped: usize,
}

/// Result of an ingestion run.
#[derive(Debug)]
pub struct IngestResult {
    pub document: VectorStoreDocument,
    pub transcripts_used: usize,
    pub transcripts_skipped: usize,
    /// Present when embeddings were attempted.
    pub embedding_report: Option<BatchReport>,
}

/// Turns transcripts into a vector store document.
pub struct Ingestor {
    chunking: ChunkingSettings,
    embedding: EmbeddingSettings,
    labels: LabelPrompts,
    embedder: Option<Arc<dyn Embedder>>,
    progress: Option<ProgressBar>,
}

impl Ingestor {
    /// Create an ingestor without an embedder; documents are built for lexical search only.
    pub fn new(settings: &Settings, prompts: &Prompts) -> Self {
        Self {
            chunking: settings.chunking.clone(),
            embedding: settings.embedding.clone(),
            labels: prompts.labels.clone(),
            embedder: None,
            progress: None,
        }
    }

    /// Embed chunks with `embedder` before saving.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Report embedding progress on the given bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Split transcripts into chunks with denormalized program number and title.
    pub fn chunk_transcripts(
        &self,
        set: &TranscriptSet,
        titles: &ProgramTitles,
        options: IngestOptions,
    ) -> ChunkedTranscripts {
        let chunker = TextChunker::new(ChunkingConfig::from(&self.chunking));
        let end = match options.limit {
            Some(limit) => options.start.saturating_add(limit).min(set.transcripts.len()),
            None => set.transcripts.len(),
        };

        let mut result = ChunkedTranscripts::default();

        for index in options.start..end {
            let transcript = &set.transcripts[index];
            let cleaned_len = crate::chunking::clean_text(transcript.text()).chars().count();
            if cleaned_len == 0 || cleaned_len < self.chunking.min_transcript_chars {
                result.skipped += 1;
                continue;
            }

            let pieces = chunker.chunk(transcript.text());
            if pieces.is_empty() {
                result.skipped += 1;
                continue;
            }

            let transcript_id = transcript.id_or_index(index);
            let program_number = transcript.program();
            let title = match program_number {
                Some(n) => titles
                    .get(n)
                    .map(str::to_string)
                    .unwrap_or_else(|| self.labels.program_title(n)),
                None => self.labels.general_title.clone(),
            };

            result.used += 1;
            result.chunks.extend(
                pieces
                    .into_iter()
                    .take(self.chunking.max_chunks_per_transcript.max(1))
                    .enumerate()
                    .map(|(chunk_index, text)| Chunk {
                        id: Chunk::make_id(&self.chunking.source, &transcript_id, chunk_index),
                        program_number,
                        title: Some(title.clone()),
                        text,
                        chunk_index,
                        embedding: None,
                    }),
            );
        }

        debug!(
            "Chunked {} transcripts into {} chunks ({} skipped)",
            result.used,
            result.chunks.len(),
            result.skipped
        );
        result
    }

    /// Chunk, optionally embed, and assemble a document.
    ///
    /// `has_embeddings` is set only when at least one chunk received a vector.
    #[instrument(skip_all, fields(transcripts = set.transcripts.len()))]
    pub async fn build_document(
        &self,
        set: &TranscriptSet,
        titles: &ProgramTitles,
        options: IngestOptions,
    ) -> Result<IngestResult> {
        let ChunkedTranscripts {
            mut chunks,
            used,
            skipped,
        } = self.chunk_transcripts(set, titles, options);
        info!("Created {} chunks from {} transcripts", chunks.len(), used);

        let embedding_report = match &self.embedder {
            Some(embedder) => {
                let mut batcher = EmbeddingBatcher::from_settings(embedder.clone(), &self.embedding);
                if let Some(progress) = &self.progress {
                    batcher = batcher.with_progress(progress.clone());
                }
                let report = batcher.embed_chunks(&mut chunks).await?;
                if !report.is_complete() {
                    warn!(
                        "{} of {} embedding batches failed; {} chunks have no vector",
                        report.failures.len(),
                        report.total_batches,
                        chunks.len() - report.embedded_chunks
                    );
                }
                Some(report)
            }
            None => {
                info!("No embedder configured; chunks will be saved without embeddings");
                None
            }
        };

        let has_embeddings = chunks.iter().any(|c| c.vector().is_some());
        let document = VectorStoreDocument::new(chunks, set.total_transcripts, has_embeddings);

        Ok(IngestResult {
            document,
            transcripts_used: used,
            transcripts_skipped: skipped,
            embedding_report,
        })
    }

    /// Full run: read the input files, build the document and overwrite the store file.
    #[instrument(skip(self, store), fields(input = %input.display()))]
    pub async fn run(
        &self,
        input: &Path,
        titles: Option<&Path>,
        store: &JsonFileStore,
        options: IngestOptions,
    ) -> Result<IngestResult> {
        let set = TranscriptSet::load(input)?;
        info!("Loaded {} transcripts", set.transcripts.len());

        let titles = match titles {
            Some(path) => {
                let titles = ProgramTitles::load(path)?;
                info!("Loaded {} program titles", titles.len());
                titles
            }
            None => ProgramTitles::default(),
        };

        let result = self.build_document(&set, &titles, options).await?;
        store.save(&result.document).await?;
        Ok(result)
    }
}
