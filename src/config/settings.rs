//! Configuration settings for Ganj.

use crate::embedding::BatchMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub vector_store: VectorStoreSettings,
    pub rag: RagSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.ganj".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Number of chunks sent to the provider per request.
    pub batch_size: usize,
    /// Pause between consecutive batch requests, in milliseconds.
    pub batch_pause_ms: u64,
    /// What to do when a batch fails (strict aborts, lenient skips).
    pub mode: BatchMode,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            batch_size: 100,
            batch_pause_ms: 350,
            mode: BatchMode::Lenient,
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Chunks shorter than this (after trimming) are dropped.
    pub min_chunk_chars: usize,
    /// Transcripts shorter than this (after cleaning) are skipped.
    pub min_transcript_chars: usize,
    /// Upper bound on chunks kept per transcript.
    pub max_chunks_per_transcript: usize,
    /// Source tag used as the chunk id prefix.
    pub source: String,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_chars: 50,
            min_transcript_chars: 100,
            max_chunks_per_transcript: 10,
            source: "telegram".to_string(),
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Path to the JSON vector store document.
    pub path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            path: "~/.ganj/rag-embeddings.json".to_string(),
        }
    }
}

/// RAG (Retrieval-Augmented Generation) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// LLM model for response generation.
    pub model: String,
    /// Sampling temperature for generation.
    pub temperature: f32,
    /// Maximum tokens in a generated answer.
    pub max_tokens: u32,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Hard cap on the assembled context, in characters.
    pub max_context_chars: usize,
    /// Longest accepted user message, in characters.
    pub max_message_chars: usize,
    /// Number of trailing history turns forwarded to the model.
    pub history_turns: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            top_k: 5,
            max_context_chars: 3000,
            max_message_chars: 500,
            history_turns: 3,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ganj")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded vector store document path.
    pub fn vector_store_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_ingestion_constants() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert_eq!(settings.embedding.batch_size, 100);
        assert_eq!(settings.embedding.mode, BatchMode::Lenient);
        assert_eq!(settings.rag.top_k, 5);
        assert_eq!(settings.rag.max_message_chars, 500);
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[embedding]\nbatch_size = 32\nmode = \"strict\"\n\n[rag]\ntop_k = 8"
        )
        .unwrap();

        let settings = Settings::load_from(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(settings.embedding.batch_size, 32);
        assert_eq!(settings.embedding.mode, BatchMode::Strict);
        assert_eq!(settings.embedding.model, "text-embedding-3-small");
        assert_eq!(settings.rag.top_k, 8);
        assert_eq!(settings.rag.max_context_chars, 3000);
    }

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.server.port, 3000);
    }
}
