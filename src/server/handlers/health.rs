//! Liveness handlers.

use axum::Json;

use crate::models::HealthCheck;

/// Root liveness endpoint.
pub async fn root() -> Json<HealthCheck> {
    Json(HealthCheck::new("Medilens Backend Running"))
}

/// Health check endpoint for container orchestration.
pub async fn health() -> Json<HealthCheck> {
    Json(HealthCheck::new("healthy"))
}
