//! Visualization HTTP Routes
//!
//! Demographic breakdowns for one diagnosis. Every endpoint takes
//! `{"diagnosis": "..."}`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::errors::{ApiError, ApiResult};
use super::run_blocking;
use crate::engine::{AdmissionsEngine, AgeHistogram, Demographics, PyramidBucket, SexDistribution};

#[derive(Debug, Deserialize)]
pub struct DiagnosisRequest {
    #[serde(alias = "diagnostico")]
    pub diagnosis: String,
}

/// Routes mounted under `/api/visualization`
pub fn visualization_routes(engine: Arc<AdmissionsEngine>) -> Router {
    Router::new()
        .route("/age-pyramid", post(age_pyramid_handler))
        .route("/age-histogram", post(age_histogram_handler))
        .route("/gender-distribution", post(sex_distribution_handler))
        .route("/demographics", post(demographics_handler))
        .with_state(engine)
}

fn diagnosis(payload: Result<Json<DiagnosisRequest>, JsonRejection>) -> ApiResult<String> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    Ok(request.diagnosis)
}

async fn age_pyramid_handler(
    State(engine): State<Arc<AdmissionsEngine>>,
    payload: Result<Json<DiagnosisRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<PyramidBucket>>> {
    let diagnosis = diagnosis(payload)?;
    let pyramid = run_blocking(engine, move |engine| engine.age_pyramid(&diagnosis)).await?;
    Ok(Json(pyramid))
}

async fn age_histogram_handler(
    State(engine): State<Arc<AdmissionsEngine>>,
    payload: Result<Json<DiagnosisRequest>, JsonRejection>,
) -> ApiResult<Json<AgeHistogram>> {
    let diagnosis = diagnosis(payload)?;
    let histogram = run_blocking(engine, move |engine| engine.age_histogram(&diagnosis)).await?;
    Ok(Json(histogram))
}

async fn sex_distribution_handler(
    State(engine): State<Arc<AdmissionsEngine>>,
    payload: Result<Json<DiagnosisRequest>, JsonRejection>,
) -> ApiResult<Json<SexDistribution>> {
    let diagnosis = diagnosis(payload)?;
    let split = run_blocking(engine, move |engine| engine.sex_distribution(&diagnosis)).await?;
    Ok(Json(split))
}

async fn demographics_handler(
    State(engine): State<Arc<AdmissionsEngine>>,
    payload: Result<Json<DiagnosisRequest>, JsonRejection>,
) -> ApiResult<Json<Demographics>> {
    let diagnosis = diagnosis(payload)?;
    let all = run_blocking(engine, move |engine| engine.demographics(&diagnosis)).await?;
    Ok(Json(all))
}
