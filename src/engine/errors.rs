//! # Engine Errors
//!
//! Every store failure surfaces as one opaque [`EngineError::QueryFailed`].
//! The underlying cause stays attached as the error source for logging.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The record store could not answer the request
    #[error("query failed")]
    QueryFailed(#[source] StoreError),
}

impl EngineError {
    /// Underlying store failure, for logs only
    pub fn cause(&self) -> &StoreError {
        match self {
            EngineError::QueryFailed(err) => err,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::QueryFailed(err)
    }
}
