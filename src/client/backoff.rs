//! Named backoff functions.

use std::fmt;
use std::time::Duration;

use http::StatusCode;

use super::HttpResponse;

/// A backoff function selected by name.
///
/// | name | policy |
/// |---|---|
/// | `""`, `default`, `exponential` | [`BackoffPolicy::Default`] |
/// | `jitter` | [`BackoffPolicy::LinearJitter`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Doubles the minimum wait per attempt, capped at the maximum wait.
    /// A `Retry-After` seconds header on 429/503 takes precedence.
    Default,
    /// A random wait in `[min, max)` multiplied by the attempt number.
    LinearJitter,
}

impl BackoffPolicy {
    /// Looks up a policy by name, ignoring case. Empty means default.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "" | "default" | "exponential" => Some(Self::Default),
            "jitter" => Some(Self::LinearJitter),
            _ => None,
        }
    }

    /// Computes the wait before the next attempt.
    ///
    /// `retry` is 0 before the first retry, 1 before the second, and so on.
    /// `response` is the failed attempt's response, if it produced one.
    #[must_use]
    pub fn delay(
        self,
        min: Duration,
        max: Duration,
        retry: u32,
        response: Option<&HttpResponse>,
    ) -> Duration {
        match self {
            Self::Default => exponential(min, max, retry, response),
            Self::LinearJitter => linear_jitter(min, max, retry),
        }
    }
}

impl fmt::Display for BackoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::LinearJitter => "jitter",
        })
    }
}

fn exponential(min: Duration, max: Duration, retry: u32, response: Option<&HttpResponse>) -> Duration {
    if let Some(response) = response {
        if matches!(
            response.status,
            StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
        ) {
            if let Some(wait) = response.retry_after() {
                return wait;
            }
        }
    }

    2_u32
        .checked_pow(retry)
        .and_then(|factor| min.checked_mul(factor))
        .map_or(max, |wait| wait.min(max))
}

fn linear_jitter(min: Duration, max: Duration, retry: u32) -> Duration {
    let attempt = retry.saturating_add(1);
    if max <= min {
        return min.saturating_mul(attempt);
    }

    let jitter = (max - min).mul_f64(fastrand::f64());
    (min + jitter).saturating_mul(attempt)
}
