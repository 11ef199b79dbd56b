//! Context building for RAG responses.

use super::SourceRef;
use crate::config::LabelPrompts;
use crate::search::SearchHit;
use crate::vector_store::Chunk;
use std::collections::HashSet;

/// Separator placed between context entries.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Marker appended when the context is truncated.
pub const TRUNCATION_MARKER: &str = "...";

/// Bracketed program reference shown above a chunk.
pub fn chunk_label(chunk: &Chunk, labels: &LabelPrompts) -> String {
    match chunk.program_number {
        Some(number) => {
            let title = chunk
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| labels.program_title(number));
            labels
                .program_header
                .replace("{{number}}", &number.to_string())
                .replace("{{title}}", &title)
        }
        None => labels.general_header.clone(),
    }
}

/// Format hits as labelled excerpts, capped at `max_chars` characters plus a marker.
pub fn build_context(hits: &[SearchHit], labels: &LabelPrompts, max_chars: usize) -> String {
    let context = hits
        .iter()
        .map(|hit| format!("{}\n{}", chunk_label(&hit.chunk, labels), hit.chunk.text))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    truncate_chars(context, max_chars)
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// One source per distinct program number, in retrieval order.
///
/// Chunks without a program number are not cited.
pub fn collect_sources(hits: &[SearchHit]) -> Vec<SourceRef> {
    let mut seen = HashSet::new();
    hits.iter()
        .filter_map(|hit| {
            let number = hit.chunk.program_number?;
            seen.insert(number).then(|| SourceRef {
                program_number: Some(number),
                title: hit.chunk.title.clone(),
                score: Some(hit.score),
            })
        })
        .collect()
}

/// Distinct program numbers among the hits, in retrieval order.
pub fn distinct_programs(hits: &[SearchHit]) -> Vec<u32> {
    let mut seen = HashSet::new();
    hits.iter()
        .filter_map(|hit| hit.chunk.program_number)
        .filter(|number| seen.insert(*number))
        .collect()
}
