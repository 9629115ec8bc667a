//! Transcript sources.
//!
//! A [`TranscriptFetcher`] resolves a video URL or id and tries its sources in
//! order until one yields text. The reply mirrors the `get_transcript` message:
//! `{transcript, error?, method?}`.

mod api;
mod file;

pub use api::ApiTranscriptSource;
pub use file::{read_transcript, FileTranscriptSource};

use crate::config::Settings;
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:
            # Full YouTube URLs
            (?:https?://)?
            (?:www\.|m\.)?
            (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
            ([a-zA-Z0-9_-]{11})
        )
        |
        # Bare video ID (11 characters)
        ^([a-zA-Z0-9_-]{11})$
    ",
    )
    .expect("valid video id regex")
});

/// Extract a video id from a YouTube URL or bare id.
///
/// Other URLs fall back to their `v` query parameter, then their last path
/// segment.
pub fn video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if let Some(caps) = VIDEO_ID.captures(input) {
        return caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string());
    }

    let url = Url::parse(input).ok()?;
    if let Some((_, v)) = url.query_pairs().find(|(k, v)| k == "v" && !v.is_empty()) {
        return Some(v.into_owned());
    }

    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

/// One timed line of a transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptSegment {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl TranscriptSegment {
    pub fn new(timestamp: &str, text: &str) -> Self {
        Self {
            timestamp: Some(timestamp.to_string()),
            text: Some(text.to_string()),
        }
    }
}

/// Render segments as `"<timestamp> <text>"` lines.
pub fn format_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|seg| {
            let timestamp = seg
                .timestamp
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or("[no timestamp]");
            let text = seg
                .text
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or("[no text]");
            format!("{} {}", timestamp, text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reply to a transcript request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl TranscriptResponse {
    pub fn found(transcript: String, method: &str) -> Self {
        Self {
            transcript: Some(transcript),
            error: None,
            method: Some(method.to_string()),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            transcript: None,
            error: Some(error.into()),
            method: None,
        }
    }
}

/// A strategy for obtaining a transcript.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Short label reported as the retrieval method.
    fn name(&self) -> &str;

    /// Fetch the transcript, `Ok(None)` when this source has none.
    async fn fetch(&self, video_id: &str) -> Result<Option<String>>;
}

/// Tries transcript sources in order.
pub struct TranscriptFetcher {
    sources: Vec<Box<dyn TranscriptSource>>,
}

impl TranscriptFetcher {
    pub fn new(sources: Vec<Box<dyn TranscriptSource>>) -> Self {
        Self { sources }
    }

    /// API first, then the local transcripts directory when configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut sources: Vec<Box<dyn TranscriptSource>> = vec![Box::new(ApiTranscriptSource::new(
            &settings.transcript.api_endpoint,
            Duration::from_secs(settings.transcript.timeout_secs),
        )?)];

        if let Some(dir) = &settings.transcript.local_dir {
            sources.push(Box::new(FileTranscriptSource::new(Settings::expand_path(dir))));
        }

        Ok(Self::new(sources))
    }

    /// Resolve `input` to a video id and fetch its transcript.
    #[instrument(skip(self))]
    pub async fn fetch(&self, input: &str) -> TranscriptResponse {
        let Some(id) = video_id(input) else {
            return TranscriptResponse::failed("No video ID found");
        };

        for source in &self.sources {
            match source.fetch(&id).await {
                Ok(Some(transcript)) if !transcript.trim().is_empty() => {
                    info!("Fetched transcript for {} via {}", id, source.name());
                    return TranscriptResponse::found(transcript, source.name());
                }
                Ok(_) => debug!("{} has no transcript for {}", source.name(), id),
                Err(e) => warn!("{} failed for {}: {}", source.name(), id, e),
            }
        }

        TranscriptResponse::failed("Could not fetch transcript via API or local files")
    }
}
