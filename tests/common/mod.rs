//! Common test utilities - WashdTest harness and a fake Gemini upstream

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use washd::config::GeminiConfig;
use washd::laundry::OccupancyStore;
use washd::{Config, Server};

/// Test harness that spawns a real washd server on a random port
pub struct WashdTest {
    pub addr: SocketAddr,
    pub client: Client,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
}

impl WashdTest {
    /// Start a server with default settings and no Gemini key
    pub async fn start() -> Result<Self> {
        Self::start_with_config(Config::default()).await
    }

    /// Start a server talking to a fake Gemini upstream
    pub async fn start_with_gemini(gemini: &FakeGemini) -> Result<Self> {
        let config = Config {
            gemini: gemini.config(),
            ..Default::default()
        };
        Self::start_with_config(config).await
    }

    /// Start a server with the given config (bind address is replaced)
    pub async fn start_with_config(mut config: Config) -> Result<Self> {
        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);
        config.bind_addr = addr;

        let server = Arc::new(Server::new(config)?);
        let server_clone = server.clone();

        // Spawn the server in a background task
        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            server,
            _handle: handle,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// POST and decode the reply as (status, JSON)
    pub async fn post_json(&self, path: &str, body: Value) -> Result<(u16, Value)> {
        let resp = self.post(path, &body).await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    /// Claim a machine, returning the HTTP status and body
    pub async fn claim(&self, session_id: &str) -> Result<(u16, Value)> {
        self.post_json("/api/laundry/claim", json!({ "sessionId": session_id }))
            .await
    }

    /// Release the session's machine
    pub async fn leave(&self, session_id: &str) -> Result<(u16, Value)> {
        self.post_json("/api/laundry/leave", json!({ "sessionId": session_id }))
            .await
    }

    /// Current machine list from /api/laundry/status
    pub async fn machines(&self) -> Result<Vec<Value>> {
        let body: Value = self.get("/api/laundry/status").await?.json().await?;
        Ok(body["machines"].as_array().cloned().unwrap_or_default())
    }

    /// Direct access to the store for assertions
    pub fn occupancy(&self) -> Arc<OccupancyStore> {
        self.server.occupancy()
    }

    /// Shutdown the server gracefully
    pub fn shutdown(&self) {
        self.server.shutdown();
    }
}

impl Drop for WashdTest {
    fn drop(&mut self) {
        self.server.shutdown();
    }
}

/// API key the fake upstream accepts
pub const FAKE_API_KEY: &str = "test-key";

/// What the fake upstream answers with
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// One candidate carrying a text part and an inline image
    Image { mime_type: String, data: String },
    /// One candidate with text only
    TextOnly(String),
    /// No candidates at all
    Empty,
    /// Google-style error envelope with the given status
    Error { status: u16, message: String },
}

#[derive(Clone)]
struct FakeState {
    reply: Arc<Mutex<FakeReply>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A request received by the fake upstream
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path after `/models/`, e.g. `gemini-2.5-flash-image:generateContent`
    pub target: String,
    pub body: Value,
}

/// Minimal stand-in for the Gemini generateContent endpoint
pub struct FakeGemini {
    pub addr: SocketAddr,
    state: FakeState,
    _handle: JoinHandle<()>,
}

impl FakeGemini {
    pub async fn start(reply: FakeReply) -> Result<Self> {
        let state = FakeState {
            reply: Arc::new(Mutex::new(reply)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let router = Router::new()
            .route("/models/{*target}", post(generate_content))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client settings pointing at this fake
    pub fn config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: Some(FAKE_API_KEY.to_string()),
            base_url: self.base_url(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    pub fn set_reply(&self, reply: FakeReply) {
        *self.state.reply.lock() = reply;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }
}

async fn generate_content(
    State(state): State<FakeState>,
    Path(target): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if key != FAKE_API_KEY {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}})),
        );
    }

    state.requests.lock().push(RecordedRequest { target, body });

    let reply = state.reply.lock().clone();
    match reply {
        FakeReply::Image { mime_type, data } => (
            StatusCode::OK,
            Json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [
                            {"text": "Here is the image without its background."},
                            {"inlineData": {"mimeType": mime_type, "data": data}}
                        ]
                    },
                    "finishReason": "STOP"
                }]
            })),
        ),
        FakeReply::TextOnly(text) => (
            StatusCode::OK,
            Json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
            })),
        ),
        FakeReply::Empty => (StatusCode::OK, Json(json!({"candidates": []}))),
        FakeReply::Error { status, message } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({"error": {"code": status, "message": message}})),
        ),
    }
}
