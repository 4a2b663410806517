//! Error types for the aggregation store.

use lendstats_core::AnalyticsError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or the command failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The key holds a different structure than the operation expects.
    #[error("wrong type for key {key}: expected {expected}")]
    WrongType {
        /// The offending key.
        key: String,
        /// The structure the operation needed.
        expected: &'static str,
    },
}

impl From<StoreError> for AnalyticsError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}
