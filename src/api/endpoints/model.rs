//! Model metadata endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::types::ApiContext;
use crate::ports::ClassifierInfo;

/// `GET /model`: estimator kind, feature schema, artifact digest and load
/// time.
pub async fn info(State(ctx): State<ApiContext>) -> Json<ClassifierInfo> {
    Json(ctx.service.model_info())
}
