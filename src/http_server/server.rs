//! # HTTP Server
//!
//! Main HTTP server combining all endpoint routers.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use super::config::HttpServerConfig;
use super::observability_routes::{health_routes, observability_routes};
use super::patient_routes::patient_routes;
use super::visualization_routes::visualization_routes;
use crate::engine::AdmissionsEngine;
use crate::observability::Logger;

/// HTTP server for the admissions dashboard
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn with_config(config: HttpServerConfig, engine: Arc<AdmissionsEngine>) -> Self {
        let router = Self::build_router(&config, engine);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router(config: &HttpServerConfig, engine: Arc<AdmissionsEngine>) -> Router {
        let api = patient_routes(engine.clone())
            .nest("/visualization", visualization_routes(engine.clone()));

        Router::new()
            .merge(health_routes())
            .nest("/api", api)
            .nest("/observability", observability_routes(engine))
            .layer(config.cors_layer())
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self
            .config
            .bind_addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;
        Logger::info("HTTP_SERVER_LISTENING", &[("addr", &addr.to_string())]);
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
