//! CLI output formatting utilities.

use crate::search::SearchHit;
use crate::vector_store::Chunk;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a search hit.
    pub fn search_hit(hit: &SearchHit) {
        println!(
            "\n{} {} (score: {:.2}, {})",
            style(">>").green(),
            style(chunk_heading(&hit.chunk)).bold(),
            hit.score,
            style(hit.mode).dim()
        );
        println!("   {}", content_preview(&hit.chunk.text, 200));
    }

    /// Print a stored chunk.
    pub fn chunk(chunk: &Chunk) {
        println!(
            "\n{} {} {}",
            style(">>").cyan(),
            style(format!("#{}", chunk.chunk_index)).bold(),
            style(&chunk.id).dim()
        );
        println!("   {}", content_preview(&chunk.text, 300));
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn chunk_heading(chunk: &Chunk) -> String {
    match (chunk.program_number, &chunk.title) {
        (Some(n), Some(title)) => format!("#{} {}", n, title),
        (Some(n), None) => format!("#{}", n),
        (None, Some(title)) => title.clone(),
        (None, None) => chunk.id.clone(),
    }
}

/// Truncate content with ellipsis, counting characters.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let preview: String = content.chars().take(max_chars).collect();
        format!("{}...", preview)
    }
}
