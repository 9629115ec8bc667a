//! HTTP API for the browser extension.
//!
//! `POST /message` takes the same `{action, ...}` objects the extension sends
//! between its own components and answers with the operation's reply.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, Reply, Request};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
pub struct AppState {
    orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/message", post(message))
        .route("/sessions", get(sessions))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;
    if settings.api_keys().is_empty() {
        Output::warning("No API keys configured; summarize, questions and ask_question will fail.");
    }

    let app = router(Arc::new(AppState::new(orchestrator)));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("tldw API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Message", "POST /message");
    Output::kv("Sessions", "GET  /sessions");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    indexing_failures: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        indexing_failures: state.orchestrator.errors().len(),
    })
}

async fn message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<Request>,
) -> Json<Reply> {
    Json(state.orchestrator.dispatch(request).await)
}

async fn sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.orchestrator.store().slots().await {
        Ok(slots) => Json(slots).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_store::MemoryChunkStore;
    use crate::orchestrator::tests::{orchestrator, CountingEmbedder, ScriptedCompleter};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    async fn spawn_api() -> String {
        let completer = ScriptedCompleter::new(|request| {
            (Duration::ZERO, Ok(format!("echo: {}", request.system)))
        });
        let orch = orchestrator(
            completer,
            CountingEmbedder::new(false),
            Arc::new(MemoryChunkStore::new()),
        );
        let app = router(Arc::new(AppState::new(orch)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn assert_send<T: Send>(_: T) {}

    #[tokio::test]
    async fn test_dispatch_future_is_send() {
        let orch = orchestrator(
            ScriptedCompleter::new(|_| (Duration::ZERO, Ok("ok".to_string()))),
            CountingEmbedder::new(false),
            Arc::new(MemoryChunkStore::new()),
        );
        assert_send(orch.dispatch(Request::Summarize {
            transcript: words(1500),
            session: None,
        }));
    }

    #[tokio::test]
    async fn test_multi_chunk_summary_over_http() {
        let base = spawn_api().await;
        let reply: Value = reqwest::Client::new()
            .post(format!("{}/message", base))
            .json(&json!({ "action": "summarize", "transcript": words(1500) }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let summary = reply.as_str().unwrap();
        assert_eq!(summary.split("\n\n").count(), 2);
        assert!(summary.starts_with("echo: You are an expert educator"));
    }

    #[tokio::test]
    async fn test_message_round_trip() {
        let base = spawn_api().await;
        let client = reqwest::Client::new();

        let reply: Value = client
            .post(format!("{}/message", base))
            .json(&json!({ "action": "summarize", "transcript": "0:00 hi there", "session": "t" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(reply.as_str().unwrap().starts_with("echo: You are an expert educator"));

        let reply: Value = client
            .post(format!("{}/message", base))
            .json(&json!({ "action": "get_transcript", "url": "not a url" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(reply["transcript"], Value::Null);
        assert!(reply["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() {
        let base = spawn_api().await;
        let response = reqwest::Client::new()
            .post(format!("{}/message", base))
            .json(&json!({ "action": "dance" }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_health_and_sessions() {
        let base = spawn_api().await;

        let health: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["indexing_failures"], 0);

        let sessions: Value = reqwest::get(format!("{}/sessions", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(sessions, json!([]));
    }
}
