//! Error types for HTTP operations and retry policy validation.

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes what went wrong without dictating recovery strategy.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    ///
    /// This typically indicates a configuration error rather than
    /// a transient failure.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Every attempt allowed by the retry policy failed.
    #[error("Giving up after {attempts} attempt(s): {last_error}")]
    GaveUp {
        /// Number of attempts made
        attempts: u32,
        /// Description of the final failure
        last_error: String,
    },
}

/// Error type for retry policy validation and use.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError {
    /// Minimum wait is not strictly positive.
    #[error("duration {0:?} must be positive")]
    InvalidDuration(std::time::Duration),

    /// Attempt ceiling is not strictly positive.
    #[error("number {0} must be positive")]
    InvalidAttemptCount(i64),

    /// Backoff policy name is not one of default, exponential, jitter.
    #[error("invalid backoff policy '{0}'")]
    UnknownPolicy(String),

    /// A client was requested from a policy that never passed validation.
    #[error("retry configuration is not valid")]
    NotValidated,
}
