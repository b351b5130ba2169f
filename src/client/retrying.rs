//! HTTP client decorator that retries transient failures.

use std::time::Duration;

use http::StatusCode;
use tracing::{debug, warn};

use crate::time::{Sleeper, TokioSleeper};

use super::{BackoffPolicy, HttpClient, HttpError, HttpRequest, HttpResponse};

/// Wraps a transport and retries transient failures with backoff.
///
/// Built from a validated [`RetryPolicy`](super::RetryPolicy) via
/// [`build_client`](super::RetryPolicy::build_client).
///
/// # Type Parameters
///
/// - `H`: The wrapped transport
/// - `S`: The sleeper used between attempts (defaults to [`TokioSleeper`])
#[derive(Debug, Clone)]
pub struct RetryingClient<H, S = TokioSleeper> {
    inner: H,
    sleeper: S,
    wait_min: Duration,
    wait_max: Duration,
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl<H> RetryingClient<H, TokioSleeper> {
    pub(super) const fn new(
        inner: H,
        wait_min: Duration,
        wait_max: Duration,
        max_attempts: u32,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            inner,
            sleeper: TokioSleeper,
            wait_min,
            wait_max,
            max_attempts,
            backoff,
        }
    }
}

impl<H, S> RetryingClient<H, S> {
    /// Sets a custom sleeper for retry delays.
    ///
    /// This is primarily useful for testing to avoid actual delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> RetryingClient<H, S2> {
        RetryingClient {
            inner: self.inner,
            sleeper,
            wait_min: self.wait_min,
            wait_max: self.wait_max,
            max_attempts: self.max_attempts,
            backoff: self.backoff,
        }
    }

    /// Returns the wrapped transport.
    #[must_use]
    pub const fn inner(&self) -> &H {
        &self.inner
    }

    /// Returns the attempt ceiling.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the wait bounds as `(min, max)`.
    #[must_use]
    pub const fn wait_bounds(&self) -> (Duration, Duration) {
        (self.wait_min, self.wait_max)
    }

    /// Returns the backoff function.
    #[must_use]
    pub const fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }
}

impl<H: HttpClient, S: Sleeper> HttpClient for RetryingClient<H, S> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            let response = match self.inner.request(req.clone()).await {
                Ok(response) if !response.is_retryable() => return Ok(response),
                Ok(response) => {
                    last_error = format!("unexpected status {}", response.status);
                    Some(response)
                }
                // Non-retryable errors fail immediately
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    last_error = e.to_string();
                    None
                }
            };

            if attempt < self.max_attempts {
                let delay =
                    self.backoff
                        .delay(self.wait_min, self.wait_max, attempt - 1, response.as_ref());
                warn!(url = %req.url, attempt, ?delay, error = %last_error, "Request failed, retrying");
                self.sleeper.sleep(delay).await;
            }
        }

        debug!(url = %req.url, attempts = self.max_attempts, "Retries exhausted");
        Err(HttpError::GaveUp {
            attempts: self.max_attempts,
            last_error,
        })
    }
}

/// Extension trait for checking if a failure is worth another attempt.
pub trait IsRetryable {
    /// Returns true if the failure is potentially transient.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for HttpError {
    fn is_retryable(&self) -> bool {
        match self {
            // Network errors are typically transient
            Self::Connection(_) | Self::Timeout => true,
            Self::InvalidUrl(_) | Self::GaveUp { .. } => false,
        }
    }
}

impl IsRetryable for HttpResponse {
    fn is_retryable(&self) -> bool {
        (self.status.is_server_error() && self.status != StatusCode::NOT_IMPLEMENTED)
            || self.status == StatusCode::TOO_MANY_REQUESTS
            || self.status == StatusCode::REQUEST_TIMEOUT
    }
}
