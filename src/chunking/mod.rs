//! Transcript chunking for building the searchable corpus.
//!
//! Raw transcript text is first cleaned (URLs, tags and whitespace runs removed),
//! then split into overlapping fixed-size windows that prefer to end on a
//! sentence or line boundary.

mod clean;
mod window;

pub use clean::clean_text;
pub use window::split_into_chunks;

use crate::config::ChunkingSettings;

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub max_chars: usize,
    /// Characters shared between consecutive chunks.
    pub overlap: usize,
    /// Chunks shorter than this after trimming are dropped.
    pub min_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap: 200,
            min_chars: 50,
        }
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            max_chars: settings.chunk_size,
            overlap: settings.chunk_overlap,
            min_chars: settings.min_chunk_chars,
        }
    }
}

/// Splits cleaned transcript text according to a [`ChunkingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    /// Create a chunker with the given configuration.
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Clean raw transcript text and split it into chunks.
    pub fn chunk(&self, raw: &str) -> Vec<String> {
        let cleaned = clean_text(raw);
        if cleaned.is_empty() {
            return Vec::new();
        }
        window::split_with_min(
            &cleaned,
            self.config.max_chars,
            self.config.overlap,
            self.config.min_chars,
        )
    }
}
