//! Patient HTTP Routes
//!
//! Filtered record pages, filter options and centers per region.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};

use super::errors::{ApiError, ApiResult};
use super::run_blocking;
use crate::engine::{AdmissionsEngine, FilterCriteria, FilterOptions, PageResult};

/// Routes mounted under `/api`
pub fn patient_routes(engine: Arc<AdmissionsEngine>) -> Router {
    Router::new()
        .route("/patients/filter", post(filter_handler))
        .route("/patients/filter-options", get(filter_options_handler))
        .route("/centers/region/:region", get(region_centers_handler))
        .with_state(engine)
}

async fn filter_handler(
    State(engine): State<Arc<AdmissionsEngine>>,
    payload: Result<Json<FilterCriteria>, JsonRejection>,
) -> ApiResult<Json<PageResult>> {
    let Json(criteria) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let page = run_blocking(engine, move |engine| engine.filter_patients(&criteria)).await?;
    Ok(Json(page))
}

async fn filter_options_handler(
    State(engine): State<Arc<AdmissionsEngine>>,
) -> ApiResult<Json<FilterOptions>> {
    let options = run_blocking(engine, |engine| engine.filter_options()).await?;
    Ok(Json(options))
}

async fn region_centers_handler(
    State(engine): State<Arc<AdmissionsEngine>>,
    Path(region): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    if region.trim().is_empty() {
        return Err(ApiError::MissingParam("region".to_string()));
    }
    let centers = run_blocking(engine, move |engine| engine.centers_for_region(&region)).await?;
    Ok(Json(centers))
}
