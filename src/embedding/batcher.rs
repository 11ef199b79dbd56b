//! Batched, rate-limited embedding of chunk collections.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{GanjError, Result};
use crate::vector_store::Chunk;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

/// What happens when one batch request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// Abort the whole run on the first failed batch.
    Strict,
    /// Log the failure, leave the batch unembedded and continue.
    #[default]
    Lenient,
}

impl std::str::FromStr for BatchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(BatchMode::Strict),
            "lenient" => Ok(BatchMode::Lenient),
            _ => Err(format!("Unknown batch mode: {}", s)),
        }
    }
}

impl std::fmt::Display for BatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchMode::Strict => write!(f, "strict"),
            BatchMode::Lenient => write!(f, "lenient"),
        }
    }
}

/// A batch that could not be embedded.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Zero-based batch number.
    pub batch_index: usize,
    /// Id of the first chunk in the batch.
    pub first_chunk_id: String,
    /// Id of the last chunk in the batch.
    pub last_chunk_id: String,
    /// Number of chunks left without an embedding.
    pub chunk_count: usize,
    /// Provider error message.
    pub error: String,
}

/// Outcome of an embedding run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total_batches: usize,
    pub succeeded_batches: usize,
    pub embedded_chunks: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Whether every batch was embedded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Embeds chunks in consecutive fixed-size batches, one provider request per batch.
///
/// Batches run strictly in sequence with a pause between requests to stay under
/// provider rate limits.
pub struct EmbeddingBatcher {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    pause: Duration,
    mode: BatchMode,
    progress: Option<ProgressBar>,
}

impl EmbeddingBatcher {
    /// Create a batcher with default batch size (100), pause (350 ms) and lenient mode.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            batch_size: 100,
            pause: Duration::from_millis(350),
            mode: BatchMode::Lenient,
            progress: None,
        }
    }

    /// Create a batcher from embedding settings.
    pub fn from_settings(embedder: Arc<dyn Embedder>, settings: &EmbeddingSettings) -> Self {
        Self::new(embedder)
            .with_batch_size(settings.batch_size)
            .with_pause(Duration::from_millis(settings.batch_pause_ms))
            .with_mode(settings.mode)
    }

    /// Set the number of chunks per request (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the pause between consecutive requests.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Set the failure mode.
    pub fn with_mode(mut self, mode: BatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Report progress (one tick per batch) on the given bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Number of requests needed for `chunk_count` chunks.
    pub fn batch_count(&self, chunk_count: usize) -> usize {
        chunk_count.div_ceil(self.batch_size)
    }

    /// Embed every chunk in place.
    ///
    /// Chunks of failed batches keep `embedding: None` in lenient mode. In strict
    /// mode the first failure ends the run with an error; chunks embedded before
    /// it keep their vectors.
    #[instrument(skip_all, fields(chunks = chunks.len(), batch_size = self.batch_size, mode = %self.mode))]
    pub async fn embed_chunks(&self, chunks: &mut [Chunk]) -> Result<BatchReport> {
        let total_batches = self.batch_count(chunks.len());
        let mut report = BatchReport {
            total_batches,
            ..BatchReport::default()
        };

        if let Some(progress) = &self.progress {
            progress.set_length(total_batches as u64);
        }

        for (index, batch) in chunks.chunks_mut(self.batch_size).enumerate() {
            info!("Processing batch {}/{}", index + 1, total_batches);

            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            match self.request(&texts).await {
                Ok(vectors) => {
                    for (chunk, vector) in batch.iter_mut().zip(vectors) {
                        chunk.embedding = Some(vector);
                    }
                    report.succeeded_batches += 1;
                    report.embedded_chunks += batch.len();
                }
                Err(e) => {
                    let failure = BatchFailure {
                        batch_index: index,
                        first_chunk_id: batch.first().map(|c| c.id.clone()).unwrap_or_default(),
                        last_chunk_id: batch.last().map(|c| c.id.clone()).unwrap_or_default(),
                        chunk_count: batch.len(),
                        error: e.to_string(),
                    };
                    error!(
                        batch = index + 1,
                        first = %failure.first_chunk_id,
                        last = %failure.last_chunk_id,
                        "Embedding batch failed: {}",
                        e
                    );

                    match self.mode {
                        BatchMode::Strict => {
                            return Err(GanjError::Embedding(format!(
                                "batch {}/{} ({} .. {}) failed: {}",
                                index + 1,
                                total_batches,
                                failure.first_chunk_id,
                                failure.last_chunk_id,
                                failure.error
                            )));
                        }
                        BatchMode::Lenient => report.failures.push(failure),
                    }
                }
            }

            if let Some(progress) = &self.progress {
                progress.inc(1);
            }

            if index + 1 < total_batches && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        Ok(report)
    }

    /// One provider request, with the response size checked against the input.
    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.embedder.embed_batch(texts).await?;
        if vectors.len() != texts.len() {
            return Err(GanjError::Embedding(format!(
                "Provider returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}
