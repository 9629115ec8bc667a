//! Transcript lookup through a public transcript API.

use super::TranscriptSource;
use crate::error::{Result, TldwError};
use crate::http::{classify, create_client, ensure_success, parse_endpoint};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Queries `{endpoint}?part=transcript&id=<video id>`.
pub struct ApiTranscriptSource {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl ApiTranscriptSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        parse_endpoint(endpoint)?;

        Ok(Self {
            client: create_client(timeout)?,
            endpoint: endpoint.to_string(),
            timeout,
        })
    }
}

/// Pull transcript text out of the known response layouts.
fn extract_transcript(body: &Value) -> Option<String> {
    if let Some(text) = body.get("transcript").and_then(Value::as_str) {
        let text = text.trim();
        return (!text.is_empty()).then(|| text.to_string());
    }

    let segments = body
        .pointer("/items/0/transcript")
        .filter(|v| v.is_array())
        .or_else(|| body.pointer("/video/transcript/segments"))
        .and_then(Value::as_array)?;

    let text = segments
        .iter()
        .map(|seg| {
            seg.get("text")
                .and_then(Value::as_str)
                .or_else(|| seg.pointer("/snippet/text").and_then(Value::as_str))
                .unwrap_or("")
        })
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\n', " ");

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait]
impl TranscriptSource for ApiTranscriptSource {
    fn name(&self) -> &str {
        "API"
    }

    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("part", "transcript"), ("id", video_id)])
            .send()
            .await
            .map_err(|e| classify(&self.endpoint, self.timeout, e))?;

        let response = ensure_success(&self.endpoint, response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| classify(&self.endpoint, self.timeout, e))?;

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| TldwError::malformed(&self.endpoint, e.to_string()))?;

        let transcript = extract_transcript(&value);
        debug!(
            "Transcript API returned {} characters",
            transcript.as_ref().map_or(0, String::len)
        );
        Ok(transcript)
    }
}
