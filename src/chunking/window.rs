//! Overlapping window splitting with sentence-boundary preference.
//!
//! All lengths and offsets are counted in characters (Unicode scalar values),
//! never bytes, so Persian text is never cut inside a code point.

/// Minimum length of a kept chunk when no explicit minimum is given.
pub const MIN_CHUNK_CHARS: usize = 50;

/// Characters a window may end on.
const BOUNDARIES: [char; 4] = ['.', '?', '!', '\n'];

/// Split `text` into windows of at most `max_chars` characters sharing about
/// `overlap` characters with their predecessor.
///
/// Text that already fits is returned whole as a single chunk. Otherwise
/// windows shorter than [`MIN_CHUNK_CHARS`] after trimming are dropped.
pub fn split_into_chunks(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    split_with_min(text, max_chars, overlap, MIN_CHUNK_CHARS)
}

pub(super) fn split_with_min(
    text: &str,
    max_chars: usize,
    overlap: usize,
    min_chars: usize,
) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if len <= max_chars {
        return vec![text.to_string()];
    }
    // A zero-width window can never make progress.
    let max_chars = max_chars.max(1);

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let mut end = (start + max_chars).min(len);

        if end < len {
            // Only accept a boundary past the middle of the window so a chunk
            // never shrinks below half its nominal size.
            let floor = start + max_chars / 2;
            if let Some(p) = (floor + 1..end).rev().find(|&i| BOUNDARIES.contains(&chars[i])) {
                end = p + 1;
            }
        }

        let window: String = chars[start..end].iter().collect();
        chunks.push(window.trim().to_string());

        if end >= len {
            break;
        }

        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { start + 1 };
    }

    chunks
        .into_iter()
        .filter(|chunk| chunk.chars().count() >= min_chars)
        .collect()
}
