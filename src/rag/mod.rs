//! RAG (Retrieval-Augmented Generation) chat over the transcript archive.
//!
//! A chat turn validates the message, retrieves relevant chunks, assembles a
//! bounded context and asks the generation provider for an answer. Without a
//! provider, or when it fails, a templated answer lists the matching programs.

pub mod context;
mod generator;
mod response;

pub use context::{build_context, chunk_label, collect_sources, distinct_programs};
pub use generator::{ChatGenerator, OpenAIChatGenerator};
pub use response::{fallback_answer, RagEngine};

use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    fn parse(role: &str) -> Option<Self> {
        match role.trim().to_lowercase().as_str() {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// A validated conversation turn forwarded to the generation provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A history entry as sent by the client. Malformed entries are ignored, not rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl HistoryEntry {
    /// Convert into a turn when the role is known and the content non-empty.
    pub fn to_turn(&self) -> Option<ChatTurn> {
        let role = ChatRole::parse(&self.role)?;
        let content = self.content.trim();
        (!content.is_empty()).then(|| ChatTurn {
            role,
            content: content.to_string(),
        })
    }
}

/// Incoming chat request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: Vec::new(),
        }
    }
}

/// A cited program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// How the answer text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    /// Written by the generation provider.
    Generated,
    /// Filled in from a template.
    Fallback,
}

/// Answer returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<SourceRef>,
    #[serde(skip)]
    pub kind: AnswerKind,
}
