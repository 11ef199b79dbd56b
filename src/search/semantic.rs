//! Semantic ranking: brute-force cosine scan.

use super::{rank_descending, ScoredChunk};
use crate::vector_store::{cosine_similarity, Chunk};

/// Rank chunks by cosine similarity to `query_embedding`.
///
/// Chunks without an embedding take no part in the ranking, nor do chunks
/// whose vector yields a non-finite score (NaN or infinite components).
pub fn semantic_rank<'a>(
    query_embedding: &[f32],
    chunks: &'a [Chunk],
    top_k: usize,
) -> Vec<ScoredChunk<'a>> {
    if top_k == 0 {
        return Vec::new();
    }

    let scored = chunks
        .iter()
        .filter_map(|chunk| {
            let score = cosine_similarity(query_embedding, chunk.vector()?);
            score.is_finite().then_some(ScoredChunk { chunk, score })
        })
        .collect();

    rank_descending(scored, top_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, embedding: Option<Vec<f32>>) -> Chunk {
        Chunk {
            id: id.to_string(),
            program_number: None,
            title: None,
            text: String::new(),
            chunk_index: 0,
            embedding,
        }
    }

    #[test]
    fn test_orders_by_similarity() {
        let chunks = vec![
            chunk("orthogonal", Some(vec![0.0, 1.0])),
            chunk("same", Some(vec![2.0, 0.0])),
            chunk("opposite", Some(vec![-1.0, 0.0])),
            chunk("close", Some(vec![1.0, 0.5])),
        ];

        let ranked = semantic_rank(&[1.0, 0.0], &chunks, 10);
        let ids: Vec<&str> = ranked.iter().map(|s| s.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["same", "close", "orthogonal", "opposite"]);
        assert!((ranked[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_skips_missing_and_empty_embeddings() {
        let chunks = vec![
            chunk("none", None),
            chunk("empty", Some(Vec::new())),
            chunk("ok", Some(vec![1.0, 1.0])),
        ];

        let ranked = semantic_rank(&[1.0, 1.0], &chunks, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].chunk.id, "ok");
    }

    #[test]
    fn test_corrupt_vectors_never_rank() {
        let chunks = vec![
            chunk("nan", Some(vec![f32::NAN, 1.0])),
            chunk("inf", Some(vec![f32::INFINITY, 0.0])),
            chunk("good", Some(vec![0.0, 1.0])),
        ];

        let ranked = semantic_rank(&[1.0, 0.0], &chunks, 10);
        let ids: Vec<&str> = ranked.iter().map(|s| s.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["good"]);
    }

    #[test]
    fn test_mismatched_dimensions_score_zero() {
        let chunks = vec![chunk("short", Some(vec![1.0])), chunk("good", Some(vec![1.0, 0.0]))];
        let ranked = semantic_rank(&[1.0, 0.0], &chunks, 10);
        assert_eq!(ranked[0].chunk.id, "good");
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn test_top_k() {
        let chunks: Vec<Chunk> = (0..4).map(|i| chunk(&i.to_string(), Some(vec![1.0, i as f32]))).collect();
        assert_eq!(semantic_rank(&[1.0, 0.0], &chunks, 2).len(), 2);
        assert!(semantic_rank(&[1.0, 0.0], &chunks, 0).is_empty());
        assert!(semantic_rank(&[1.0, 0.0], &[], 3).is_empty());
    }
}
