//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{infrastructure::dto::http::PeerSummaryDto, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of currently connected peers (ops/debugging view)
pub async fn get_peers(State(state): State<Arc<AppState>>) -> Json<Vec<PeerSummaryDto>> {
    let peers = state.list_peers_usecase.snapshot().await;

    // Domain Model から DTO への変換
    let summaries: Vec<PeerSummaryDto> = peers.into_iter().map(PeerSummaryDto::from).collect();

    Json(summaries)
}
