use crate::error::{ServerError, ServerResult};
use crate::routes::SERVICE_NAME;
use crate::state::ServerState;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
}

impl HealthStatus {
    pub fn current() -> Self {
        let uptime = SERVER_START_TIME
            .elapsed()
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
        }
    }
}

/// Pin the uptime origin to server startup rather than the first health probe
pub fn mark_start() {
    once_cell::sync::Lazy::force(&SERVER_START_TIME);
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus::current())
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let handle = state.metrics.as_ref().ok_or(ServerError::NotFound)?;
    Ok((
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
