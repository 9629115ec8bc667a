//! Client for the local sentence-embedding server.

use super::Embedder;
use crate::config::Settings;
use crate::error::{Result, TldwError};
use crate::http::{classify, create_client, ensure_success, parse_endpoint};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Embedder backed by an HTTP `POST {text}` -> `{embedding}` service.
#[derive(Debug)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpEmbedder {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        parse_endpoint(endpoint)?;

        Ok(Self {
            client: create_client(timeout)?,
            endpoint: endpoint.to_string(),
            timeout,
        })
    }

    /// Create an embedder from the `[embedding]` settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.embedding.endpoint,
            Duration::from_secs(settings.embedding.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for HttpEmbedder {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(TldwError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { text })
            .send()
            .await
            .map_err(|e| classify(&self.endpoint, self.timeout, e))?;

        let response = ensure_success(&self.endpoint, response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| classify(&self.endpoint, self.timeout, e))?;

        let parsed: EmbedResponse = serde_json::from_str(&body)
            .map_err(|e| TldwError::malformed(&self.endpoint, e.to_string()))?;

        if parsed.embedding.is_empty() {
            return Err(TldwError::malformed(&self.endpoint, "embedding is empty"));
        }

        debug!("Received {}-dimensional embedding", parsed.embedding.len());
        Ok(parsed.embedding)
    }
}
