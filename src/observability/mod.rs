//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Counters-only metrics
//! - Begin/complete scopes around engine operations
//!
//! Observability is read-only: nothing here changes query results, and a
//! failed log write never fails a request.
//!
//! ```ignore
//! use admissions_engine::observability::{Logger, MetricsRegistry, ObservationScope};
//!
//! Logger::info("SERVER_STARTED", &[("port", "8000")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_executed();
//!
//! let scope = ObservationScope::new("FILTER_OPTIONS");
//! scope.complete();
//! ```

mod logger;
mod metrics;
mod scope;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;
