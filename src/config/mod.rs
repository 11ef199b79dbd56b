//! Configuration module for Ganj.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{FallbackPrompts, LabelPrompts, MessagePrompts, Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, PromptSettings, RagSettings,
    ServerSettings, Settings, VectorStoreSettings,
};
