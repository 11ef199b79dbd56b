//! Similarity search over the vector store document.
//!
//! Two rankers share one entry point. [`SearchMode::select`] picks between them
//! per call: semantic (cosine similarity) when the caller brings a query
//! embedding and the store has embeddings, lexical (token overlap) otherwise.

mod lexical;
mod semantic;

pub use lexical::{lexical_rank, tokenize_query, PHRASE_BONUS};
pub use semantic::semantic_rank;

use crate::vector_store::{Chunk, DocumentStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Ranking strategy used for one search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Cosine similarity between embedding vectors.
    Semantic,
    /// Query-token occurrence counting with an exact-phrase bonus.
    Lexical,
}

impl SearchMode {
    /// Semantic only when both sides have vectors.
    pub fn select(has_query_embedding: bool, store_has_embeddings: bool) -> Self {
        if has_query_embedding && store_has_embeddings {
            SearchMode::Semantic
        } else {
            SearchMode::Lexical
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Semantic => write!(f, "semantic"),
            SearchMode::Lexical => write!(f, "lexical"),
        }
    }
}

/// A chunk borrowed from the document together with its score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

/// A ranked search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Cosine similarity (semantic) or match score (lexical). Higher is better.
    pub score: f32,
    /// Ranker that produced this hit.
    pub mode: SearchMode,
}

/// Search engine over a shared, read-only document store.
#[derive(Clone)]
pub struct SearchEngine {
    store: Arc<dyn DocumentStore>,
}

impl SearchEngine {
    /// Create an engine reading from `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Return at most `top_k` chunks, best first.
    ///
    /// An unavailable or empty store yields no hits.
    #[instrument(skip(self, query_embedding), fields(has_embedding = query_embedding.is_some()))]
    pub async fn search(
        &self,
        query: &str,
        query_embedding: Option<&[f32]>,
        top_k: usize,
    ) -> Vec<SearchHit> {
        let Some(document) = self.store.load().await else {
            return Vec::new();
        };
        if document.chunks.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mode = SearchMode::select(query_embedding.is_some(), document.has_embeddings);
        let ranked = match (mode, query_embedding) {
            (SearchMode::Semantic, Some(embedding)) => {
                semantic_rank(embedding, &document.chunks, top_k)
            }
            _ => lexical_rank(query, &document.chunks, top_k),
        };

        debug!("{} search returned {} hits", mode, ranked.len());

        ranked
            .into_iter()
            .map(|scored| SearchHit {
                chunk: scored.chunk.clone(),
                score: scored.score,
                mode,
            })
            .collect()
    }

    /// Every chunk of one program, in document order.
    pub async fn chunks_by_program(&self, program_number: u32) -> Vec<Chunk> {
        match self.store.load().await {
            Some(document) => document
                .chunks_by_program(program_number)
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Summary of the loaded store, if any.
    pub async fn stats(&self) -> Option<StoreStats> {
        let document = self.store.load().await?;
        Some(StoreStats {
            version: document.version.clone(),
            created_at: document.created_at.to_rfc3339(),
            total_chunks: document.chunks.len(),
            total_transcripts: document.total_transcripts,
            embedded_chunks: document.embedded_count(),
            has_embeddings: document.has_embeddings,
        })
    }
}

/// Summary information about the loaded store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub version: String,
    pub created_at: String,
    pub total_chunks: usize,
    pub total_transcripts: usize,
    pub embedded_chunks: usize,
    pub has_embeddings: bool,
}

/// Sort descending by score, keeping input order among equal scores, then keep `top_k`.
fn rank_descending(mut scored: Vec<ScoredChunk<'_>>, top_k: usize) -> Vec<ScoredChunk<'_>> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{MemoryStore, VectorStoreDocument};

    fn chunk(id: &str, text: &str, embedding: Option<Vec<f32>>) -> Chunk {
        Chunk {
            id: id.to_string(),
            program_number: None,
            title: None,
            text: text.to_string(),
            chunk_index: 0,
            embedding,
        }
    }

    fn engine(chunks: Vec<Chunk>, has_embeddings: bool) -> SearchEngine {
        let document = VectorStoreDocument::new(chunks, 1, has_embeddings);
        SearchEngine::new(Arc::new(MemoryStore::new(document)))
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(SearchMode::select(true, true), SearchMode::Semantic);
        assert_eq!(SearchMode::select(true, false), SearchMode::Lexical);
        assert_eq!(SearchMode::select(false, true), SearchMode::Lexical);
        assert_eq!(SearchMode::select(false, false), SearchMode::Lexical);
    }

    #[tokio::test]
    async fn test_semantic_when_embedding_supplied() {
        let engine = engine(
            vec![
                chunk("a", "دور", Some(vec![0.0, 1.0])),
                chunk("b", "نزدیک", Some(vec![1.0, 0.1])),
            ],
            true,
        );

        let hits = engine.search("هرچه", Some(&[1.0, 0.0]), 5).await;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.id, "b");
        assert_eq!(hits[0].mode, SearchMode::Semantic);
    }

    #[tokio::test]
    async fn test_same_engine_serves_both_modes() {
        let engine = engine(
            vec![
                chunk("a", "درباره عشق و حضور", Some(vec![0.0, 1.0])),
                chunk("b", "درباره ذهن", Some(vec![1.0, 0.0])),
            ],
            true,
        );

        let semantic = engine.search("حضور", Some(&[1.0, 0.0]), 1).await;
        assert_eq!(semantic[0].chunk.id, "b");

        let lexical = engine.search("حضور", None, 1).await;
        assert_eq!(lexical[0].chunk.id, "a");
        assert_eq!(lexical[0].mode, SearchMode::Lexical);
    }

    #[tokio::test]
    async fn test_lexical_when_store_lacks_embeddings() {
        let engine = engine(vec![chunk("a", "سلام برنامه", None)], false);
        let hits = engine.search("برنامه", Some(&[1.0, 0.0]), 5).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].mode, SearchMode::Lexical);
    }

    #[tokio::test]
    async fn test_empty_or_missing_store() {
        let empty = engine(Vec::new(), false);
        assert!(empty.search("سلام برنامه", None, 5).await.is_empty());

        let missing = SearchEngine::new(Arc::new(MemoryStore::empty()));
        assert!(missing.search("سلام برنامه", Some(&[1.0]), 5).await.is_empty());
        assert!(missing.chunks_by_program(1).await.is_empty());
        assert!(missing.stats().await.is_none());
    }

    #[tokio::test]
    async fn test_top_k_zero_and_oversized() {
        let engine = engine(
            vec![
                chunk("a", "عشق", Some(vec![1.0, 0.0])),
                chunk("b", "عشق عشق", Some(vec![0.5, 0.5])),
                chunk("c", "ذهن", Some(vec![0.0, 1.0])),
            ],
            true,
        );

        assert!(engine.search("عشق", Some(&[1.0, 0.0]), 0).await.is_empty());
        assert!(engine.search("عشق", None, 0).await.is_empty());

        let all = engine.search("عشق", Some(&[1.0, 0.0]), 50).await;
        let ids: Vec<&str> = all.iter().map(|h| h.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(all.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_mixed_store_excludes_unembedded_chunks() {
        // Three transcripts, two chunks each; the second embedding batch failed.
        let chunks: Vec<Chunk> = (0..6)
            .map(|i| {
                let embedding = (i < 4).then(|| vec![1.0, i as f32]);
                chunk(&format!("telegram_{}_{}", i / 2, i % 2), "برنامه", embedding)
            })
            .collect();
        let engine = engine(chunks, true);

        let hits = engine.search("برنامه", Some(&[1.0, 0.0]), 10).await;
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|h| h.chunk.embedding.is_some()));
    }

    #[tokio::test]
    async fn test_chunks_by_program_and_stats() {
        let mut a = chunk("a", "یک", Some(vec![1.0]));
        a.program_number = Some(7);
        let mut b = chunk("b", "دو", None);
        b.program_number = Some(8);
        let mut c = chunk("c", "سه", None);
        c.program_number = Some(7);
        let engine = engine(vec![a, b, c], true);

        let ids: Vec<String> = engine
            .chunks_by_program(7)
            .await
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);

        let stats = engine.stats().await.unwrap();
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.embedded_chunks, 1);
    }
}
