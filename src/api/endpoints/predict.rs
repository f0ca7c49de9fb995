//! Prediction endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::domain::{PatientRecord, ReadmissionPrediction};

/// `POST /predict`: readmission probability for one patient record.
///
/// Any subset of fields may be sent; unknown fields are ignored.
pub async fn predict(
    State(ctx): State<ApiContext>,
    payload: Result<Json<PatientRecord>, JsonRejection>,
) -> Result<Json<ReadmissionPrediction>, ApiError> {
    let Json(record) = payload?;
    let prediction = ctx.service.predict(&record)?;
    Ok(Json(prediction))
}
