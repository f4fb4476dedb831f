//! Observability HTTP Routes
//!
//! Status banner, health check and the metrics snapshot.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::engine::AdmissionsEngine;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Root status banner
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: String,
}

/// Create observability routes
pub fn observability_routes(engine: Arc<AdmissionsEngine>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(engine)
}

/// Root banner and health check
pub fn health_routes() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}

async fn root_handler() -> impl IntoResponse {
    Json(StatusMessage {
        message: "Hospital admissions API is running".to_string(),
    })
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn metrics_handler(State(engine): State<Arc<AdmissionsEngine>>) -> impl IntoResponse {
    (StatusCode::OK, Json(engine.metrics().snapshot()))
}
