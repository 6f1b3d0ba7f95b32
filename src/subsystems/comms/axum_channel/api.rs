//! Axum handlers for `/api/*` routes.
//!
//! Each handler receives [`AxumState`] and answers through [`CommsState`]
//! with a bounded wait; a stuck subsystem yields 504 instead of a hung
//! request.

use std::future::Future;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::AxumState;
use crate::error::AppError;
use crate::subsystems::planner::model::TravelFilters;

const TIMEOUT: Duration = Duration::from_secs(5);

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct MessageRequest {
    message: String,
}

#[derive(Deserialize)]
pub(super) struct EventsQuery {
    #[serde(default)]
    after: u64,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

/// Await `fut` with a timeout and map the outcome to a response.
async fn respond<T, F>(state: &AxumState, what: &str, fut: F) -> Result<T, Response>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(TIMEOUT, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(channel_id = %state.channel_id, "{what} failed: {e}");
            Err((StatusCode::BAD_GATEWAY, json_error("internal", e)).into_response())
        }
        Err(_) => {
            warn!(channel_id = %state.channel_id, "{what} timed out");
            Err((StatusCode::GATEWAY_TIMEOUT, json_error("timeout", format!("{what} timed out"))).into_response())
        }
    }
}

fn ok_json<T: Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

fn raw_json(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

// ── Management ────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AxumState>) -> Response {
    match respond(&state, "health request", state.comms.management_health()).await {
        Ok(body) => raw_json(body),
        Err(r) => r,
    }
}

/// GET /api/tree
pub(super) async fn tree(State(state): State<AxumState>) -> Response {
    match respond(&state, "tree request", state.comms.management_tree()).await {
        Ok(body) => raw_json(body),
        Err(r) => r,
    }
}

// ── Planner ───────────────────────────────────────────────────────────────────

/// GET /api/itinerary
pub(super) async fn itinerary(State(state): State<AxumState>) -> Response {
    match respond(&state, "itinerary request", state.comms.itinerary()).await {
        Ok(snapshot) => ok_json(snapshot),
        Err(r) => r,
    }
}

/// POST /api/itinerary/regenerate
pub(super) async fn regenerate(State(state): State<AxumState>) -> Response {
    match respond(&state, "regenerate", state.comms.regenerate()).await {
        Ok(snapshot) => ok_json(snapshot),
        Err(r) => r,
    }
}

/// POST /api/export — no file is produced; the toast is the whole effect.
pub(super) async fn export(State(state): State<AxumState>) -> Response {
    match respond(&state, "export", state.comms.export()).await {
        Ok(snapshot) => (StatusCode::ACCEPTED, Json(snapshot)).into_response(),
        Err(r) => r,
    }
}

/// GET /api/map
pub(super) async fn map(State(state): State<AxumState>) -> Response {
    match respond(&state, "map request", state.comms.map_view()).await {
        Ok(view) => ok_json(view),
        Err(r) => r,
    }
}

/// GET /api/map/select/{name}
pub(super) async fn map_select(State(state): State<AxumState>, Path(name): Path<String>) -> Response {
    match respond(&state, "map select", state.comms.select_location(&name)).await {
        Ok(Some(location)) => ok_json(location),
        Ok(None) => (StatusCode::NOT_FOUND, json_error("not_found", format!("no location named {name}"))).into_response(),
        Err(r) => r,
    }
}

/// GET /api/filters
pub(super) async fn filters(State(state): State<AxumState>) -> Response {
    match respond(&state, "filters request", state.comms.filters()).await {
        Ok(filters) => ok_json(filters),
        Err(r) => r,
    }
}

/// PUT /api/filters — full replacement; out-of-range values are clamped.
pub(super) async fn set_filters(State(state): State<AxumState>, Json(filters): Json<TravelFilters>) -> Response {
    match respond(&state, "filters update", state.comms.set_filters(filters)).await {
        Ok(applied) => ok_json(applied),
        Err(r) => r,
    }
}

// ── Chat ──────────────────────────────────────────────────────────────────────

/// GET /api/chat
pub(super) async fn transcript(State(state): State<AxumState>) -> Response {
    match respond(&state, "transcript request", state.comms.transcript()).await {
        Ok((messages, phase)) => ok_json(json!({ "phase": phase, "messages": messages })),
        Err(r) => r,
    }
}

/// POST /api/chat — blank messages are accepted and ignored (`accepted: null`).
pub(super) async fn chat(State(state): State<AxumState>, Json(req): Json<MessageRequest>) -> Response {
    let channel_id = state.channel_id.clone();
    match respond(&state, "chat submit", state.comms.send_chat(&channel_id, req.message)).await {
        Ok(accepted) => ok_json(json!({ "accepted": accepted })),
        Err(r) => r,
    }
}

/// PUT /api/chat/draft
pub(super) async fn draft(State(state): State<AxumState>, Json(req): Json<MessageRequest>) -> Response {
    let channel_id = state.channel_id.clone();
    match respond(&state, "draft update", state.comms.set_draft(&channel_id, req.message)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(r) => r,
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

/// GET /api/events?after=N
pub(super) async fn events(State(state): State<AxumState>, Query(q): Query<EventsQuery>) -> Response {
    let events = state.comms.events_since(q.after);
    let last_seq = events.last().map(|e| e.seq).unwrap_or(q.after);
    ok_json(json!({ "last_seq": last_seq, "events": events }))
}
