//! Liveness, readiness and build metadata

use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::server::state::AppState;
use crate::types::BuildInfo;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// ISO-8601, UTC
    pub timestamp: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub status: String,
    pub nats_connected: bool,
}

/// GET /health - Always healthy once the listener is up.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: state.build.version.clone(),
    })
}

/// GET /ready - Reports whether the event bus is connected.
pub async fn ready_handler(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready".to_string(),
        nats_connected: state.events.is_connected(),
    })
}

/// GET /api/version - Static build metadata.
pub async fn version_handler(State(state): State<AppState>) -> Json<BuildInfo> {
    Json(state.build.as_ref().clone())
}
