//! Health check endpoint.

use axum::Json;

use crate::api::types::HealthResponse;

/// `GET /healthz`: liveness probe.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
