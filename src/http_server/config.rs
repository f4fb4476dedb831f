//! Listener and CORS settings for the dashboard API
//!
//! Read from the `http` section of the config file. An empty
//! `cors_origins` list makes the API answer any origin; otherwise only the
//! listed origins get CORS headers.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Origin of the dashboard's Vite dev server
pub const DASHBOARD_DEV_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Interface to listen on (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Listening port (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call the API (default: the dashboard dev server)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![DASHBOARD_DEV_ORIGIN.to_string()]
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl HttpServerConfig {
    /// Same settings listening on `port` instead
    pub fn on_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Reject settings the listener or the CORS layer cannot use
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("http.host must not be empty".to_string());
        }
        if self.port == 0 {
            return Err("http.port must be > 0".to_string());
        }
        self.bind_addr()?;

        for origin in &self.cors_origins {
            let scheme_ok = origin.starts_with("http://") || origin.starts_with("https://");
            if !scheme_ok || HeaderValue::from_str(origin).is_err() {
                return Err(format!("http.cors_origins entry '{}' is not an origin", origin));
            }
        }
        Ok(())
    }

    /// Parsed `host:port`
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("invalid listen address {}:{}: {}", self.host, self.port, e))
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty()
    }

    /// CORS layer for the configured origins, any method and header
    pub fn cors_layer(&self) -> CorsLayer {
        let origins = if self.allows_any_origin() {
            AllowOrigin::from(Any)
        } else {
            AllowOrigin::list(
                self.cors_origins
                    .iter()
                    .filter_map(|origin| HeaderValue::from_str(origin).ok()),
            )
        };

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
