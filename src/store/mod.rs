//! # Record Store
//!
//! The capability the engine consumes: submit a parameterized query with
//! named bound values, receive ordered rows with column metadata.
//!
//! Connections are acquired per request through [`RecordStore::acquire`]
//! and released when the returned session is dropped, on every path.

mod config;
mod errors;
mod seed;
mod sqlite;
mod value;

pub use config::StoreConfig;
pub use errors::{StoreError, StoreResult};
pub use seed::AdmissionRow;
pub use sqlite::{admissions_schema, PooledSession, SqliteStore};
pub use value::{Params, Row, RowSet, SqlValue};

/// A source of query sessions over the admissions table
pub trait RecordStore: Send + Sync {
    /// Acquire a session for the duration of one request
    fn acquire(&self) -> StoreResult<Box<dyn StoreSession + '_>>;
}

/// One acquired connection. Dropping it releases the connection.
pub trait StoreSession {
    /// Execute a query. Placeholders are written `:name`; `params` keys
    /// omit the colon.
    fn query(&mut self, sql: &str, params: &Params) -> StoreResult<RowSet>;
}
