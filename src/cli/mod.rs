//! CLI module for tldw.

pub mod commands;
mod output;
pub mod preflight;
pub mod source;

pub use output::Output;

use clap::{Parser, Subcommand};

/// tldw - too long; didn't watch
///
/// Summaries, flashcard quizzes and grounded answers for video transcripts.
#[derive(Parser, Debug)]
#[command(name = "tldw")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level for the `tldw` target; any `-v` flag overrides the configured level.
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => configured,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a transcript and index it for questions
    Summarize {
        /// Transcript file, '-' for stdin, or a YouTube URL/ID
        source: String,

        /// Session to index the chunks under (defaults to the video ID)
        #[arg(short, long)]
        session: Option<String>,

        /// Exit without waiting for indexing to finish
        #[arg(long)]
        no_wait: bool,
    },

    /// Generate Q&A flashcards from a transcript
    Questions {
        /// Transcript file, '-' for stdin, or a YouTube URL/ID
        source: String,

        /// Print the raw **Qn:**/**An:** markup
        #[arg(long)]
        raw: bool,
    },

    /// Ask a question about an indexed transcript
    Ask {
        /// The question to ask
        question: String,

        /// Index this transcript first
        #[arg(long)]
        source: Option<String>,

        /// Session to answer from
        #[arg(short, long)]
        session: Option<String>,

        /// Print the chunks used as context
        #[arg(long)]
        show_context: bool,
    },

    /// Fetch the transcript of a video
    Transcript {
        /// YouTube URL or video ID
        url: String,

        /// Print the raw get_transcript reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// List indexed sessions
    Sessions,

    /// Start the HTTP API for the browser extension
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "5050")]
        port: u16,
    },

    /// Check configuration and backing services
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (API keys masked)
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
