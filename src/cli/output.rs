//! CLI output formatting utilities.
//!
//! Status lines go to stderr so command results on stdout can be piped.

use crate::quiz::QaPair;
use crate::rag::ScoredChunk;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        eprintln!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        eprintln!("{} {}", style(">>").green().bold(), msg);
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

    /// Print numbered flashcards.
    pub fn flashcards(pairs: &[QaPair]) {
        for pair in pairs {
            println!(
                "\n{} {}",
                style(format!("Q{}.", pair.number)).cyan().bold(),
                style(&pair.question).bold()
            );
            println!("   {}", pair.answer);
        }
    }

    /// Print the chunks an answer was built from.
    pub fn context_chunk(chunk: &ScoredChunk) {
        let score = chunk
            .score
            .map_or_else(|| "n/a".to_string(), |s| format!("{:.2}", s));
        println!(
            "\n{} chunk {} (score: {})",
            style(">>").green(),
            style(chunk.index + 1).bold(),
            score
        );
        println!("   {}", content_preview(&chunk.chunk, 200));
    }

    /// Create a spinner on stderr.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis, on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content,
    }
}
