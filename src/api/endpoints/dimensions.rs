//! Dimension metadata and reload endpoints.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::application::{DimensionMetadata, ReloadReport};

/// `GET /metadata`: known labels per categorical dimension.
pub async fn metadata(State(ctx): State<ApiContext>) -> Json<DimensionMetadata> {
    Json(ctx.service.metadata())
}

/// `POST /admin/reload-dimensions`: re-read dimension tables.
///
/// The store query is blocking, so it runs off the async workers.
pub async fn reload(State(ctx): State<ApiContext>) -> Result<Json<ReloadReport>, ApiError> {
    let service = ctx.service.clone();
    let report = tokio::task::spawn_blocking(move || service.reload_dimensions())
        .await
        .map_err(|e| ApiError::Internal(format!("reload task failed: {e}")))??;
    Ok(Json(report))
}
