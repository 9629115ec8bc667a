//! OpenAI-compatible chat completions over HTTP.

use super::{extract_response, Completer, CompletionRequest, CredentialPool};
use crate::config::Settings;
use crate::error::{Result, TldwError};
use crate::http::{classify, create_client, ensure_success, parse_endpoint};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat completion client with key rotation.
#[derive(Debug)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    credentials: CredentialPool,
    timeout: Duration,
}

impl ChatClient {
    /// Create a client for an endpoint with a default model and key pool.
    pub fn new(
        endpoint: &str,
        model: &str,
        credentials: CredentialPool,
        timeout: Duration,
    ) -> Result<Self> {
        parse_endpoint(endpoint)?;

        Ok(Self {
            client: create_client(timeout)?,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            credentials,
            timeout,
        })
    }

    /// Create a client from the `[completion]` settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.completion.endpoint,
            &settings.completion.model,
            CredentialPool::new(settings.api_keys()),
            Duration::from_secs(settings.completion.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn credentials(&self) -> &CredentialPool {
        &self.credentials
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl Completer for ChatClient {
    #[instrument(skip(self, request), fields(model = tracing::field::Empty))]
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        tracing::Span::current().record("model", model);

        let key = match request.credential.as_deref() {
            Some(key) => key,
            None => self.credentials.next().ok_or_else(|| {
                TldwError::Config(
                    "No completion API keys configured. Set TLDW_API_KEYS or completion.api_keys."
                        .to_string(),
                )
            })?,
        };

        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
        };

        debug!("Requesting completion ({} prompt chars)", request.prompt.len());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify(&self.endpoint, self.timeout, e))?;

        let response = ensure_success(&self.endpoint, response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| classify(&self.endpoint, self.timeout, e))?;

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| TldwError::malformed(&self.endpoint, e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TldwError::malformed(&self.endpoint, "response has no choices"))?;

        let raw = choice.message.and_then(|m| m.content).unwrap_or_default();
        Ok(extract_response(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::EMPTY_RESPONSE_FALLBACK;
    use crate::testing::{MockReply, MockServer};
    use axum::http::StatusCode;
    use serde_json::json;

    fn reply(content: &str) -> MockReply {
        MockReply::json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    fn client(server: &MockServer, keys: &[&str]) -> ChatClient {
        ChatClient::new(
            &server.url("/openai/v1/chat/completions"),
            "default-model",
            CredentialPool::new(keys.iter().copied()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_request_shape_and_extraction() {
        let server = MockServer::start(vec![reply("<think>hmm</think>\nFinal text")]).await;
        let client = client(&server, &["k1"]);

        let text = client
            .complete(CompletionRequest::new("the prompt", "the system"))
            .await
            .unwrap();
        assert_eq!(text, "Final text");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/openai/v1/chat/completions");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer k1"));

        let body = requests[0].json();
        assert_eq!(body["model"], "default-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "the system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "the prompt");
    }

    #[tokio::test]
    async fn test_keys_rotate_and_override_does_not_advance() {
        let server = MockServer::start(vec![reply("ok")]).await;
        let client = client(&server, &["k1", "k2"]);

        client.complete(CompletionRequest::new("a", "s")).await.unwrap();
        client
            .complete(CompletionRequest::new("b", "s").with_credential("pinned"))
            .await
            .unwrap();
        client.complete(CompletionRequest::new("c", "s")).await.unwrap();
        client.complete(CompletionRequest::new("d", "s")).await.unwrap();

        let auth: Vec<String> = server
            .requests()
            .into_iter()
            .filter_map(|r| r.authorization)
            .collect();
        assert_eq!(auth, vec!["Bearer k1", "Bearer pinned", "Bearer k2", "Bearer k1"]);
        assert_eq!(client.credentials().rotations(), 3);
    }

    #[tokio::test]
    async fn test_model_override() {
        let server = MockServer::start(vec![reply("ok")]).await;
        let client = client(&server, &["k"]);

        client
            .complete(CompletionRequest::new("p", "s").with_model("reducer"))
            .await
            .unwrap();
        assert_eq!(server.requests()[0].json()["model"], "reducer");
    }

    #[tokio::test]
    async fn test_missing_content_falls_back() {
        let server = MockServer::start(vec![MockReply::json(json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        }))])
        .await;
        let text = client(&server, &["k"])
            .complete(CompletionRequest::new("p", "s"))
            .await
            .unwrap();
        assert_eq!(text, EMPTY_RESPONSE_FALLBACK);
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let server = MockServer::start(vec![MockReply::raw(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"rate limited"}}"#,
        )])
        .await;
        let err = client(&server, &["k"])
            .complete(CompletionRequest::new("p", "s"))
            .await
            .unwrap_err();

        match err {
            TldwError::Transport { message, .. } => {
                assert!(message.contains("429"));
                assert!(message.contains("rate limited"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start(vec![MockReply::raw(StatusCode::OK, "{\"nope\": true}")]).await;
        let err = client(&server, &["k"])
            .complete(CompletionRequest::new("p", "s"))
            .await
            .unwrap_err();
        assert!(matches!(err, TldwError::MalformedResponse { .. }));

        let server = MockServer::start(vec![MockReply::json(json!({ "choices": [] }))]).await;
        let err = client(&server, &["k"])
            .complete(CompletionRequest::new("p", "s"))
            .await
            .unwrap_err();
        assert!(matches!(err, TldwError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server =
            MockServer::start(vec![reply("late").delayed(Duration::from_secs(3))]).await;
        let client = ChatClient::new(
            &server.url("/chat"),
            "m",
            CredentialPool::new(["k"]),
            Duration::from_millis(200),
        )
        .unwrap();

        let err = client
            .complete(CompletionRequest::new("p", "s"))
            .await
            .unwrap_err();
        assert!(matches!(err, TldwError::Timeout { .. }));
        assert!(err.to_string().ends_with("timed out after 200ms"));
    }

    #[tokio::test]
    async fn test_empty_pool_without_override_is_config_error() {
        let server = MockServer::start(vec![reply("ok")]).await;
        let client = client(&server, &[]);

        let err = client
            .complete(CompletionRequest::new("p", "s"))
            .await
            .unwrap_err();
        assert!(matches!(err, TldwError::Config(_)));
        assert!(server.requests().is_empty());

        let text = client
            .complete(CompletionRequest::new("p", "s").with_credential("k"))
            .await
            .unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client = ChatClient::new(
            "http://127.0.0.1:9/chat",
            "m",
            CredentialPool::new(["k"]),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client
            .complete(CompletionRequest::new("p", "s"))
            .await
            .unwrap_err();
        assert!(err.is_network());
    }
}
