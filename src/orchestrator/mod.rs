//! Operation orchestrator for tldw.
//!
//! Composes chunking, completion, embedding and the chunk store into the three
//! transcript operations: summarize, generate questions and answer a question.
//! Multi-chunk transcripts fan out one completion per chunk with bounded
//! concurrency and join every result before anything downstream runs.

mod background;
mod dispatch;

pub use background::{ErrorSink, IndexingFailure, IndexingHandle};
pub use dispatch::{Reply, Request};

use crate::chunk_store::{create_store, ChunkStore, DEFAULT_SLOT};
use crate::chunking::{WordChunker, DEFAULT_MAX_WORDS};
use crate::completion::{ChatClient, Completer, CompletionRequest};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, HttpEmbedder};
use crate::error::{Result, TldwError};
use crate::quiz::normalize_markup;
use crate::rag::{format_context, ContextBuilder, ScoredChunk};
use crate::transcript::TranscriptFetcher;
use background::spawn_indexing;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Flashcards requested for a whole transcript and kept after reduction.
pub const QUESTION_COUNT: usize = 5;
/// Flashcards requested per chunk of a longer transcript.
pub const SECTION_QUESTION_COUNT: usize = 3;

/// Tunables for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub max_words: usize,
    pub top_k: usize,
    /// Model used to select the final flashcards from all candidates.
    pub reduce_model: String,
    /// Upper bound on in-flight per-chunk completions.
    pub max_concurrent: usize,
    pub question_count: usize,
    pub section_question_count: usize,
    /// Store slot used when a request names no session.
    pub default_slot: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
            top_k: 3,
            reduce_model: "meta-llama/llama-4-maverick-17b-128e-instruct".to_string(),
            max_concurrent: 8,
            question_count: QUESTION_COUNT,
            section_question_count: SECTION_QUESTION_COUNT,
            default_slot: DEFAULT_SLOT.to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_words: settings.chunking.max_words,
            top_k: settings.retrieval.top_k,
            reduce_model: settings.completion.reduce_model.clone(),
            max_concurrent: settings.completion.max_concurrent,
            default_slot: settings.store.default_slot.clone(),
            ..Self::default()
        }
    }
}

/// Result of a summarize call.
#[derive(Debug)]
pub struct SummaryOutcome {
    pub summary: String,
    /// Background embedding of the chunks; drop it to detach.
    pub indexing: IndexingHandle,
}

/// An answer and the ranked chunks it was given.
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    pub context: Vec<ScoredChunk>,
}

/// The main orchestrator, owning every collaborator explicitly.
pub struct Orchestrator {
    config: OrchestratorConfig,
    prompts: Prompts,
    completer: Arc<dyn Completer>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn ChunkStore>,
    transcripts: Option<Arc<TranscriptFetcher>>,
    errors: ErrorSink,
}

impl Orchestrator {
    /// Build the orchestrator and its HTTP clients from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let completer = Arc::new(ChatClient::from_settings(settings)?);
        let embedder = Arc::new(HttpEmbedder::from_settings(settings)?);
        let store = create_store(settings)?;
        let transcripts = TranscriptFetcher::from_settings(settings)?;

        info!(
            "Using {} for completions, store provider '{}'",
            completer.model(),
            settings.store.provider
        );

        Ok(Self::with_components(
            OrchestratorConfig::from_settings(settings),
            prompts,
            completer,
            embedder,
            store,
        )
        .with_transcripts(transcripts))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        config: OrchestratorConfig,
        prompts: Prompts,
        completer: Arc<dyn Completer>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn ChunkStore>,
    ) -> Self {
        Self {
            config,
            prompts,
            completer,
            embedder,
            store,
            transcripts: None,
            errors: ErrorSink::new(),
        }
    }

    /// Attach a transcript fetcher for `get_transcript` requests.
    pub fn with_transcripts(mut self, fetcher: TranscriptFetcher) -> Self {
        self.transcripts = Some(Arc::new(fetcher));
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn ChunkStore> {
        self.store.clone()
    }

    /// Failures of detached indexing tasks.
    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }

    pub fn transcripts(&self) -> Option<&TranscriptFetcher> {
        self.transcripts.as_deref()
    }

    /// Store slot for a session, falling back to the default slot.
    pub fn slot_for(&self, session: Option<&str>) -> String {
        session
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.config.default_slot.as_str())
            .to_string()
    }

    fn chunk(&self, transcript: &str) -> Result<Vec<String>> {
        let chunks = WordChunker::new(self.config.max_words).chunk(transcript);
        if chunks.iter().all(|c| c.is_empty()) {
            return Err(TldwError::InvalidInput("Transcript is empty".to_string()));
        }
        Ok(chunks)
    }

    /// Summarize a transcript.
    ///
    /// The chunks are embedded and stored in the session's slot by a
    /// background task that never affects the returned summary.
    #[instrument(skip(self, transcript), fields(words = transcript.split_whitespace().count()))]
    pub async fn summarize(&self, transcript: &str, session: Option<&str>) -> Result<SummaryOutcome> {
        let chunks = self.chunk(transcript)?;
        let indexing = self.spawn_index(chunks.clone(), session);

        let summary = if chunks.len() == 1 {
            let prompts = &self.prompts.summarize;
            let prompt = self.prompts.render_with_custom(&prompts.user, &[("transcript", transcript)]);
            self.completer
                .complete(CompletionRequest::new(prompt, &prompts.system))
                .await?
        } else {
            info!("Summarizing {} chunks", chunks.len());
            let prompts = &self.prompts.summarize;
            self.map_chunks(&chunks, &prompts.section_system, &prompts.section_user, &[])
                .await?
                .join("\n\n")
        };

        Ok(SummaryOutcome {
            summary,
            indexing,
        })
    }

    /// Embed and store a transcript's chunks without generating anything.
    pub fn index(&self, transcript: &str, session: Option<&str>) -> Result<IndexingHandle> {
        let chunks = self.chunk(transcript)?;
        Ok(self.spawn_index(chunks, session))
    }

    fn spawn_index(&self, chunks: Vec<String>, session: Option<&str>) -> IndexingHandle {
        spawn_indexing(
            self.embedder.clone(),
            self.store.clone(),
            self.slot_for(session),
            chunks,
            self.errors.clone(),
        )
    }

    /// Generate Q&A flashcards in `**Qn:** / **An:**` markup.
    #[instrument(skip(self, transcript), fields(words = transcript.split_whitespace().count()))]
    pub async fn questions(&self, transcript: &str) -> Result<String> {
        let chunks = self.chunk(transcript)?;
        let prompts = &self.prompts.questions;
        let count = self.config.question_count.to_string();

        let raw = if chunks.len() == 1 {
            let prompt = self.prompts.render_with_custom(
                &prompts.user,
                &[("transcript", transcript), ("count", &count)],
            );
            self.completer
                .complete(CompletionRequest::new(prompt, &prompts.system))
                .await?
        } else {
            let section_count = self.config.section_question_count.to_string();
            let candidates = self
                .map_chunks(
                    &chunks,
                    &prompts.section_system,
                    &prompts.section_user,
                    &[("count", &section_count)],
                )
                .await?
                .join("\n\n");

            debug!("Selecting {} flashcards with {}", count, self.config.reduce_model);
            let prompt = self.prompts.render_with_custom(
                &prompts.select_user,
                &[("candidates", &candidates), ("count", &count)],
            );
            self.completer
                .complete(
                    CompletionRequest::new(prompt, &prompts.select_system)
                        .with_model(&self.config.reduce_model),
                )
                .await?
        };

        Ok(normalize_markup(&raw, self.config.question_count))
    }

    /// Answer a question from the chunks stored for `session`.
    ///
    /// With nothing stored the model answers from an empty context.
    pub async fn ask_question(&self, question: &str, session: Option<&str>) -> Result<String> {
        self.answer(question, session).await.map(|a| a.answer)
    }

    /// Like [`Orchestrator::ask_question`], also returning the chunks used.
    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str, session: Option<&str>) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TldwError::InvalidInput("Question is empty".to_string()));
        }

        let chunks = ContextBuilder::new(self.store.clone(), self.embedder.clone())
            .with_top_k(self.config.top_k)
            .build(&self.slot_for(session), question)
            .await?;
        let context = format_context(&chunks);

        let prompts = &self.prompts.answer;
        let prompt = self
            .prompts
            .render_with_custom(&prompts.user, &[("context", &context), ("question", question)]);
        let answer = self
            .completer
            .complete(CompletionRequest::new(prompt, &prompts.system))
            .await?;

        Ok(Answer {
            answer,
            context: chunks,
        })
    }

    /// One completion per chunk, returned in chunk order.
    ///
    /// Fails on the first chunk that fails.
    async fn map_chunks(
        &self,
        chunks: &[String],
        system: &str,
        template: &str,
        vars: &[(&str, &str)],
    ) -> Result<Vec<String>> {
        let requests: Vec<(usize, CompletionRequest)> = chunks
            .iter()
            .enumerate()
            .map(|(idx, chunk)| {
                let mut all_vars = vec![("chunk", chunk.as_str())];
                all_vars.extend_from_slice(vars);
                let prompt = self.prompts.render_with_custom(template, &all_vars);
                (idx, CompletionRequest::new(prompt, system))
            })
            .collect();

        let mut results: Vec<(usize, String)> = Vec::with_capacity(requests.len());

        let mut stream = stream::iter(requests)
            .map(|(idx, request)| {
                let completer = self.completer.clone();
                async move { (idx, completer.complete(request).await) }
            })
            .buffer_unordered(self.config.max_concurrent.max(1));

        while let Some((idx, result)) = stream.next().await {
            match result {
                Ok(text) => results.push((idx, text)),
                Err(e) => {
                    debug!("Chunk {} failed: {}", idx, e);
                    return Err(e);
                }
            }
        }

        results.sort_by_key(|(idx, _)| *idx);
        Ok(results.into_iter().map(|(_, text)| text).collect())
    }
}
