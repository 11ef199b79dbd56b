//! Transcript text normalization.

use regex::Regex;
use std::sync::LazyLock;

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("Invalid regex"));

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Strip URLs and HTML-like tags, collapse whitespace runs to single spaces, and trim.
pub fn clean_text(text: &str) -> String {
    let without_urls = URL_REGEX.replace_all(text, " ");
    let without_tags = TAG_REGEX.replace_all(&without_urls, " ");
    WHITESPACE_REGEX
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_urls_and_tags() {
        let text = "Watch <a href=\"x\">here</a> HTTPS://YouTube.com/watch?v=abc now";
        assert_eq!(clean_text(text), "Watch here now");
    }

    #[test]
    fn test_collapses_newlines_and_tabs() {
        assert_eq!(clean_text("one\r\n\r\ntwo\t\tthree  "), "one two three");
    }

    #[test]
    fn test_persian_text_untouched() {
        let text = "مولانا می‌فرماید: «بشنو این نی چون شکایت می‌کند»";
        assert_eq!(clean_text(text), text);
    }
}
