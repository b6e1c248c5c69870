//! Health and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
}

impl HealthResponse {
    fn new(backend_up: bool) -> Self {
        let label = if backend_up { "healthy" } else { "unhealthy" };
        Self {
            // The service is only as healthy as the backend it renders from
            status: label,
            version: env!("CARGO_PKG_VERSION"),
            backend: label,
        }
    }
}

async fn backend_up(state: &AppState) -> bool {
    match state.backend.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Content backend health check failed");
            false
        }
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let up = backend_up(&state).await;
    let status = if up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthResponse::new(up)))
}

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if backend_up(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
