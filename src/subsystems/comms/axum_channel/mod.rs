//! Axum-based HTTP channel — the JSON shell under `/api/`.
//!
//! Implements [`Component`] so it slots into the comms lifecycle: `run()`
//! drives the axum event loop and the shared [`CancellationToken`] is wired
//! to axum's graceful shutdown.
//!
//! ```text
//! GET  /api/health
//! GET  /api/tree                 component tree
//! GET  /api/itinerary
//! POST /api/itinerary/regenerate
//! POST /api/export
//! GET  /api/map
//! GET  /api/map/select/{name}
//! GET  /api/filters
//! PUT  /api/filters
//! GET  /api/chat                 transcript + phase
//! POST /api/chat                 {"message": "..."}
//! PUT  /api/chat/draft           {"message": "..."}
//! GET  /api/events?after=N
//! GET  /favicon.ico              → 204
//! ```

mod api;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::subsystems::runtime::{Component, ComponentFuture};

use super::state::CommsState;

/// Router state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub(crate) struct AxumState {
    pub channel_id: Arc<str>,
    pub comms: Arc<CommsState>,
}

// ── AxumChannel ───────────────────────────────────────────────────────────────

pub struct AxumChannel {
    channel_id: String,
    bind_addr: String,
    state: Arc<CommsState>,
}

impl AxumChannel {
    pub fn new(channel_id: impl Into<String>, bind_addr: impl Into<String>, state: Arc<CommsState>) -> Self {
        Self {
            channel_id: channel_id.into(),
            bind_addr: bind_addr.into(),
            state,
        }
    }
}

impl Component for AxumChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_axum(self.channel_id, self.bind_addr, self.state, shutdown))
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

async fn run_axum(
    channel_id: String,
    bind_addr: String,
    comms: Arc<CommsState>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let router = build_router(&channel_id, comms);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Comms(format!("axum bind failed on {bind_addr}: {e}")))?;

    info!(%channel_id, %bind_addr, "axum channel listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Comms(format!("axum server error: {e}")))?;

    info!(%channel_id, "axum channel shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(channel_id: &str, comms: Arc<CommsState>) -> Router {
    let state = AxumState { channel_id: Arc::from(channel_id), comms };
    Router::new()
        .route("/api/health",               get(api::health))
        .route("/api/tree",                 get(api::tree))
        .route("/api/itinerary",            get(api::itinerary))
        .route("/api/itinerary/regenerate", post(api::regenerate))
        .route("/api/export",               post(api::export))
        .route("/api/map",                  get(api::map))
        .route("/api/map/select/{name}",    get(api::map_select))
        .route("/api/filters",              get(api::filters).put(api::set_filters))
        .route("/api/chat",                 get(api::transcript).post(api::chat))
        .route("/api/chat/draft",           put(api::draft))
        .route("/api/events",               get(api::events))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(state)
}
