// handlers/public - endpoints reachable without a token
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: chrono::DateTime<Utc>,
}

/// GET / - service name and version
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - 503 while the database is unreachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = Utc::now();

    match state.database.ping().await {
        Ok(()) => ApiResponse::success(HealthStatus {
            status: "healthy",
            database: "connected",
            timestamp,
        }),
        Err(err) => {
            warn!(error = %err, "health check failed");
            ApiResponse::with_status(
                HealthStatus {
                    status: "unhealthy",
                    database: "disconnected",
                    timestamp,
                },
                StatusCode::SERVICE_UNAVAILABLE,
            )
        }
    }
}
