//! # HTTP Server Module
//!
//! Dashboard API over the admissions engine, combined into one Axum
//! router.
//!
//! # Endpoints
//!
//! - `/`, `/health` - Status banner and health check
//! - `/api/patients/*` - Filtered records and filter options
//! - `/api/centers/region/:region` - Centers per region
//! - `/api/visualization/*` - Demographic breakdowns
//! - `/observability/*` - Metrics

pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod patient_routes;
pub mod server;
pub mod visualization_routes;

use std::sync::Arc;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;

use crate::engine::{AdmissionsEngine, EngineResult};

/// Run a synchronous engine call on the blocking pool
pub(crate) async fn run_blocking<T, F>(engine: Arc<AdmissionsEngine>, call: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&AdmissionsEngine) -> EngineResult<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || call(&engine))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(result?)
}
