//! Refresh signal and health endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use tracing::debug;

use crate::backend::AppState;
use shared::RefreshSignalResponse;

/// Current refresh generation. Views poll this and re-fetch when it moves.
pub async fn get_refresh_signal(State(state): State<AppState>) -> impl IntoResponse {
    let generation = state.refresh_coordinator.generation();
    debug!("GET /api/refresh - generation {}", generation);
    (StatusCode::OK, Json(RefreshSignalResponse { generation }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
