//! Error types for lendstats.

use crate::ids::IdError;

/// Result type for lendstats operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur while ingesting events, computing statistics or
/// running scheduled maintenance.
///
/// There is no variant for a partially applied multi-key
/// update: when one store write of an event succeeds and a later one fails,
/// the caller sees `StoreUnavailable` and the earlier write stays applied.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// The event payload is missing a required field.
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    /// The aggregation store could not be reached or rejected an operation.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A scheduled job failed mid-run.
    #[error("scheduled job {job} failed: {message}")]
    SchedulerJobFailure {
        /// Name of the job that failed.
        job: String,
        /// Underlying failure.
        message: String,
    },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AnalyticsError {
    /// Build a `MissingParameter` error naming the absent field.
    #[must_use]
    pub fn missing(field: &str) -> Self {
        Self::MissingParameter(format!("{field} is required"))
    }
}

impl From<IdError> for AnalyticsError {
    fn from(err: IdError) -> Self {
        Self::MissingParameter(err.to_string())
    }
}
