//! Flat-file vector store for Ganj.
//!
//! The whole corpus lives in one JSON document holding every chunk and its
//! embedding. A document is produced once per ingestion run and then only read.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Format version written into new documents.
pub const DOCUMENT_VERSION: &str = "1.0";

/// A searchable slice of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic id: `{source}_{transcript_id}_{chunk_index}`.
    pub id: String,
    /// Program number of the owning transcript.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_number: Option<u32>,
    /// Display title of the owning program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Chunk text.
    pub text: String,
    /// Zero-based position of this chunk within its transcript.
    #[serde(rename = "chunkIndex")]
    pub chunk_index: usize,
    /// Embedding vector, absent when the chunk was never embedded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Build the deterministic chunk id.
    pub fn make_id(source: &str, transcript_id: &str, chunk_index: usize) -> String {
        format!("{}_{}_{}", source, transcript_id, chunk_index)
    }

    /// The embedding, if present and non-empty.
    pub fn vector(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|v| !v.is_empty())
    }
}

/// The persisted aggregate of all chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreDocument {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub total_chunks: usize,
    #[serde(default)]
    pub total_transcripts: usize,
    pub has_embeddings: bool,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
}

impl VectorStoreDocument {
    /// Create a document stamped with the current time.
    pub fn new(chunks: Vec<Chunk>, total_transcripts: usize, has_embeddings: bool) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            created_at: Utc::now(),
            total_chunks: chunks.len(),
            total_transcripts,
            has_embeddings,
            chunks,
        }
    }

    /// Number of chunks that carry an embedding.
    pub fn embedded_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.vector().is_some()).count()
    }

    /// All chunks of one program, in document order.
    pub fn chunks_by_program(&self, program_number: u32) -> Vec<&Chunk> {
        self.chunks
            .iter()
            .filter(|c| c.program_number == Some(program_number))
            .collect()
    }
}

/// Read access to a vector store document.
///
/// Implementations memoize the document; callers treat `None` as an empty corpus.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load the document, or `None` when it is unavailable.
    async fn load(&self) -> Option<Arc<VectorStoreDocument>>;
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths, empty vectors, or a zero norm. That value
/// marks a degenerate comparison, not orthogonality.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, program: Option<u32>, embedding: Option<Vec<f32>>) -> Chunk {
        Chunk {
            id: id.to_string(),
            program_number: program,
            title: None,
            text: "متن".to_string(),
            chunk_index: 0,
            embedding,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_self_and_symmetry() {
        let a = vec![0.3, -1.2, 4.5, 0.01];
        let b = vec![2.0, 0.5, -0.7, 3.3];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-5);
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_chunk_json_shape() {
        let mut c = chunk("telegram_42_0", Some(7), None);
        c.chunk_index = 3;
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["chunkIndex"], 3);
        assert_eq!(json["program_number"], 7);
        assert!(json.get("embedding").is_none());
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_document_counts_and_program_filter() {
        let doc = VectorStoreDocument::new(
            vec![
                chunk("a", Some(1), Some(vec![1.0])),
                chunk("b", Some(2), Some(vec![])),
                chunk("c", Some(1), None),
            ],
            2,
            true,
        );
        assert_eq!(doc.total_chunks, 3);
        assert_eq!(doc.embedded_count(), 1);

        let ids: Vec<&str> = doc.chunks_by_program(1).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(doc.chunks_by_program(99).is_empty());
    }

    #[test]
    fn test_make_id() {
        assert_eq!(Chunk::make_id("telegram", "msg_4", 2), "telegram_msg_4_2");
    }
}
