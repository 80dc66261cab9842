//! Embedded mock playground API.
//!
//! Serves the three endpoints the transport expects (ping, send, and
//! mock-message) with jittered latencies and an "unstable" toggle that turns
//! every response into a 503, so outages can be simulated end to end without
//! a real backend.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::probe::FeedMessage;

const PHRASES: &[&str] = &[
    "overriding the neural firewall",
    "compressing the optical bandwidth",
    "indexing the virtual capacitor",
    "parsing the redundant array",
    "bypassing the solid-state bus",
    "quantifying the back-end pixel",
    "synthesizing the auxiliary protocol",
    "calculating the haptic feed",
];

#[derive(Clone)]
struct MockApiState {
    unstable: Arc<AtomicBool>,
    /// Probability that a healthy ping still fails, as in the original mocks.
    flake_probability: f64,
    /// Inclusive bounds for the simulated ping delay.
    ping_delay_ms: (u64, u64),
}

/// A running mock API server.
///
/// Shuts down when dropped.
pub struct MockApi {
    addr: SocketAddr,
    unstable: Arc<AtomicBool>,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl MockApi {
    /// Start with the original playground behavior: 10% random ping failures
    /// and 20-500ms simulated latency.
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(0.1, (20, 500)).await
    }

    /// Start with no random failures and near-zero latency, for tests.
    pub async fn start_deterministic() -> std::io::Result<Self> {
        Self::start_with(0.0, (1, 3)).await
    }

    async fn start_with(
        flake_probability: f64,
        ping_delay_ms: (u64, u64),
    ) -> std::io::Result<Self> {
        let unstable = Arc::new(AtomicBool::new(false));
        let state = MockApiState {
            unstable: Arc::clone(&unstable),
            flake_probability,
            ping_delay_ms,
        };

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/api/ping/{id}", get(handle_ping))
            .route("/api/send", post(handle_send))
            .route("/api/mock-message", get(handle_mock_message))
            .route("/api/unstable", post(handle_toggle_unstable))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            unstable,
            shutdown: shutdown_tx,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the base URL for this mock server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Flip the unstable flag directly, without going through the endpoint.
    pub fn set_unstable(&self, unstable: bool) {
        self.unstable.store(unstable, Ordering::SeqCst);
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

#[derive(Serialize)]
struct PingResponse {
    ts: u64,
}

async fn handle_ping(
    State(state): State<MockApiState>,
    Path(_id): Path<String>,
) -> Result<Json<PingResponse>, StatusCode> {
    if state.unstable.load(Ordering::SeqCst) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let (flaked, delay_ms) = {
        let mut rng = rand::thread_rng();
        let flaked = state.flake_probability > 0.0 && rng.gen_bool(state.flake_probability);
        let (min, max) = state.ping_delay_ms;
        (flaked, rng.gen_range(min..=max))
    };
    if flaked {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Ok(Json(PingResponse { ts }))
}

#[derive(Deserialize)]
struct SendPayload {
    id: String,
    message: String,
}

#[derive(Serialize)]
struct SendResponse {
    id: String,
    echo: String,
}

async fn handle_send(
    State(state): State<MockApiState>,
    Json(payload): Json<SendPayload>,
) -> Result<Json<SendResponse>, StatusCode> {
    if state.unstable.load(Ordering::SeqCst) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(SendResponse {
        id: payload.id,
        echo: payload.message,
    }))
}

async fn handle_mock_message(State(state): State<MockApiState>) -> Json<FeedMessage> {
    let (delay_ms, id, message) = {
        let mut rng = rand::thread_rng();
        let (_, max) = state.ping_delay_ms;
        (
            rng.gen_range(0..=max.min(200)),
            format!("ch-{}", rng.gen_range(1000..=9999)),
            PHRASES[rng.gen_range(0..PHRASES.len())].to_string(),
        )
    };
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    Json(FeedMessage { id, message })
}

#[derive(Serialize)]
struct UnstableResponse {
    unstable: bool,
}

async fn handle_toggle_unstable(State(state): State<MockApiState>) -> Json<UnstableResponse> {
    let unstable = !state.unstable.fetch_xor(true, Ordering::SeqCst);
    Json(UnstableResponse { unstable })
}
