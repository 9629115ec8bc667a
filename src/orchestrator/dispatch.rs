//! Operation-selector boundary.
//!
//! Requests arrive as JSON objects tagged by `action`, the shape the browser
//! extension sends. Every request gets exactly one reply; failures become an
//! informative text reply instead of an error.

use super::Orchestrator;
use crate::error::TldwError;
use crate::transcript::TranscriptResponse;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// An operation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    Summarize {
        transcript: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session: Option<String>,
    },
    Questions {
        transcript: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session: Option<String>,
    },
    AskQuestion {
        question: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session: Option<String>,
    },
    GetTranscript {
        url: String,
    },
}

impl Request {
    /// The `action` tag of this request.
    pub fn action(&self) -> &'static str {
        match self {
            Request::Summarize { .. } => "summarize",
            Request::Questions { .. } => "questions",
            Request::AskQuestion { .. } => "ask_question",
            Request::GetTranscript { .. } => "get_transcript",
        }
    }
}

/// The reply to a [`Request`].
///
/// Text replies serialize as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Text(String),
    Transcript(TranscriptResponse),
}

impl Reply {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text.as_str()),
            Reply::Transcript(_) => None,
        }
    }
}

fn failure(action: &str, err: &TldwError) -> Reply {
    warn!("{} failed: {}", action, err);
    Reply::Text(format!("Error: {}", err))
}

impl Orchestrator {
    /// Run a request and produce its single reply.
    ///
    /// Summaries do not wait for background indexing.
    #[instrument(skip(self, request), fields(action = request.action()))]
    pub async fn dispatch(&self, request: Request) -> Reply {
        let action = request.action();

        match request {
            Request::Summarize {
                transcript,
                session,
            } => match self.summarize(&transcript, session.as_deref()).await {
                Ok(outcome) => Reply::Text(outcome.summary),
                Err(e) => failure(action, &e),
            },
            Request::Questions { transcript, .. } => match self.questions(&transcript).await {
                Ok(markup) => Reply::Text(markup),
                Err(e) => failure(action, &e),
            },
            Request::AskQuestion { question, session } => {
                match self.ask_question(&question, session.as_deref()).await {
                    Ok(answer) => Reply::Text(answer),
                    Err(e) => failure(action, &e),
                }
            }
            Request::GetTranscript { url } => match self.transcripts() {
                Some(fetcher) => Reply::Transcript(fetcher.fetch(&url).await),
                None => Reply::Transcript(TranscriptResponse::failed(
                    "Transcript fetching is not configured",
                )),
            },
        }
    }
}
