//! # Store Errors
//!
//! Failures raised by a record store. Callers above the engine never see
//! these directly; they are folded into a single opaque query failure.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not open or obtain a connection
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timed out waiting for a pooled connection
    #[error("No connection available after {0} ms")]
    PoolExhausted(u64),

    /// Statement preparation or execution failed
    #[error("Query failed: {0}")]
    Query(String),

    /// Result set lacks an expected column
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A column held a value of an unexpected shape
    #[error("Unexpected value in column {column}: {reason}")]
    Decode { column: String, reason: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StoreError::MissingColumn("TOTAL".to_string()).to_string(),
            "Missing column: TOTAL"
        );
        assert_eq!(
            StoreError::PoolExhausted(250).to_string(),
            "No connection available after 250 ms"
        );
    }

    #[test]
    fn test_sqlite_errors_become_query_errors() {
        let err = StoreError::from(rusqlite::Error::InvalidQuery);
        assert!(matches!(err, StoreError::Query(_)));
    }
}
