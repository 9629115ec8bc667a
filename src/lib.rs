//! tldw - too long; didn't watch
//!
//! Summaries, flashcard quizzes and grounded answers for video transcripts,
//! backed by an OpenAI-compatible chat completions API and a local embedding
//! service.
//!
//! # Overview
//!
//! tldw allows you to:
//! - Summarize a transcript, section by section for long videos
//! - Generate Q&A flashcards in `**Q1:** / **A1:**` markup
//! - Ask questions answered from the most relevant transcript chunks
//! - Serve all of the above to a browser extension over HTTP
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and prompt templates
//! - `transcript` - Video id parsing and transcript sources
//! - `chunking` - Word-bounded transcript chunks
//! - `completion` - Chat completions with credential rotation
//! - `embedding` - Embedding generation
//! - `chunk_store` - Per-session chunk and embedding storage
//! - `rag` - Similarity ranking and answer context
//! - `quiz` - Q&A flashcard parsing and markup
//! - `orchestrator` - The summarize, questions and ask operations
//!
//! # Example
//!
//! ```rust,no_run
//! use tldw::config::Settings;
//! use tldw::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings)?;
//!
//!     let transcript = std::fs::read_to_string("talk.txt")?;
//!     let outcome = orchestrator.summarize(&transcript, Some("talk")).await?;
//!     println!("{}", outcome.summary);
//!
//!     outcome.indexing.wait().await?;
//!     let answer = orchestrator.ask_question("What was the main claim?", Some("talk")).await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunk_store;
pub mod chunking;
pub mod cli;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod quiz;
pub mod rag;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, TldwError};
