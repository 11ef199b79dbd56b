//! Lexical ranking: query-token occurrence counting.
//!
//! Tokens are matched as plain substrings of the lowercased chunk text, with no
//! stemming or Persian-specific normalization.

use super::{rank_descending, ScoredChunk};
use crate::vector_store::Chunk;

/// Score added when the whole query appears verbatim in a chunk.
pub const PHRASE_BONUS: u32 = 10;

/// Lowercase the query and keep whitespace-separated words longer than two characters.
pub fn tokenize_query(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Score one chunk text against a lowercased query and its tokens.
fn score_text(query_lower: &str, tokens: &[String], text: &str) -> u32 {
    let text_lower = text.to_lowercase();

    let occurrences: usize = tokens
        .iter()
        .map(|token| text_lower.matches(token.as_str()).count())
        .sum();

    let bonus = if text_lower.contains(query_lower) {
        PHRASE_BONUS
    } else {
        0
    };

    occurrences as u32 + bonus
}

/// Rank chunks by token occurrences plus the exact-phrase bonus.
///
/// Chunks scoring zero are dropped. A query with no usable tokens matches nothing.
pub fn lexical_rank<'a>(query: &str, chunks: &'a [Chunk], top_k: usize) -> Vec<ScoredChunk<'a>> {
    let tokens = tokenize_query(query);
    if tokens.is_empty() || top_k == 0 {
        return Vec::new();
    }
    let query_lower = query.to_lowercase();

    let scored = chunks
        .iter()
        .filter_map(|chunk| {
            let score = score_text(&query_lower, &tokens, &chunk.text);
            (score > 0).then_some(ScoredChunk {
                chunk,
                score: score as f32,
            })
        })
        .collect();

    rank_descending(scored, top_k)
}
