//! Health check endpoint

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" or "error"
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// "connected" or "disconnected"
    pub database: String,
}

/// Uptime probe; reads one appointment, never writes
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and store reachable", body = HealthResponse),
        (status = 500, description = "Store unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<crate::AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.services.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                message: format!("{} is up", state.config.business.name),
                timestamp: Utc::now(),
                database: "connected".to_string(),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "error".to_string(),
                    message: "Database check failed".to_string(),
                    timestamp: Utc::now(),
                    database: "disconnected".to_string(),
                }),
            )
        }
    }
}
