//! Retry policy configuration for outbound HTTP clients.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::{BackoffPolicy, HttpClient, RetryError, RetryingClient};

/// Wait bounds, attempt ceiling, and backoff policy name.
///
/// A policy must pass [`validate`](Self::validate) once before it can
/// [`build_client`](Self::build_client). Fields change only through the
/// `with_*` builders, which drop any earlier validation. The YAML form is
/// `{wait_min: 1s, wait_max: 30s, max_attempts: 4, policy: default}`.
///
/// # Example
///
/// ```
/// use collector_config::client::RetryPolicy;
/// use std::time::Duration;
///
/// let mut policy = RetryPolicy::new()
///     .with_wait_min(Duration::from_millis(500))
///     .with_max_attempts(5)
///     .with_policy("jitter");
/// policy.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryPolicy {
    /// Minimum wait between attempts.
    #[serde(default, deserialize_with = "human_duration")]
    wait_min: Duration,

    /// Maximum wait between attempts.
    #[serde(default, deserialize_with = "human_duration")]
    wait_max: Duration,

    /// Maximum number of attempts, including the first.
    #[serde(default)]
    max_attempts: i64,

    /// Backoff policy name: `default`, `exponential`, or `jitter`.
    #[serde(default)]
    policy: String,

    #[serde(skip)]
    backoff: Option<BackoffPolicy>,
}

impl RetryPolicy {
    /// Default minimum wait (1 second).
    pub const DEFAULT_WAIT_MIN: Duration = crate::config::defaults::RETRY_WAIT_MIN;

    /// Default maximum wait (30 seconds).
    pub const DEFAULT_WAIT_MAX: Duration = crate::config::defaults::RETRY_WAIT_MAX;

    /// Default maximum attempts.
    pub const DEFAULT_MAX_ATTEMPTS: i64 = crate::config::defaults::RETRY_MAX_ATTEMPTS;

    /// Creates an unvalidated policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wait_min: Self::DEFAULT_WAIT_MIN,
            wait_max: Self::DEFAULT_WAIT_MAX,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            policy: String::new(),
            backoff: None,
        }
    }

    /// Sets the minimum wait.
    #[must_use]
    pub fn with_wait_min(mut self, wait: Duration) -> Self {
        self.wait_min = wait;
        self.backoff = None;
        self
    }

    /// Sets the maximum wait.
    #[must_use]
    pub fn with_wait_max(mut self, wait: Duration) -> Self {
        self.wait_max = wait;
        self.backoff = None;
        self
    }

    /// Sets the maximum number of attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: i64) -> Self {
        self.max_attempts = max_attempts;
        self.backoff = None;
        self
    }

    /// Sets the backoff policy name.
    #[must_use]
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = policy.into();
        self.backoff = None;
        self
    }

    /// Checks the policy and resolves its backoff function.
    ///
    /// A `wait_max` below `wait_min` is raised to `wait_min`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `wait_min` is zero ([`RetryError::InvalidDuration`])
    /// - `max_attempts` is not positive ([`RetryError::InvalidAttemptCount`])
    /// - `policy` names no known backoff ([`RetryError::UnknownPolicy`])
    pub fn validate(&mut self) -> Result<(), RetryError> {
        self.backoff = None;

        if self.wait_min.is_zero() {
            return Err(RetryError::InvalidDuration(self.wait_min));
        }
        if self.max_attempts <= 0 {
            return Err(RetryError::InvalidAttemptCount(self.max_attempts));
        }
        let backoff = BackoffPolicy::from_name(&self.policy)
            .ok_or_else(|| RetryError::UnknownPolicy(self.policy.clone()))?;

        if self.wait_max < self.wait_min {
            debug!(wait_min = ?self.wait_min, wait_max = ?self.wait_max, "Raising wait_max to wait_min");
            self.wait_max = self.wait_min;
        }

        self.backoff = Some(backoff);
        Ok(())
    }

    /// Minimum wait between attempts.
    #[must_use]
    pub const fn wait_min(&self) -> Duration {
        self.wait_min
    }

    /// Maximum wait between attempts.
    #[must_use]
    pub const fn wait_max(&self) -> Duration {
        self.wait_max
    }

    /// Maximum number of attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> i64 {
        self.max_attempts
    }

    /// Backoff policy name as configured.
    #[must_use]
    pub fn policy(&self) -> &str {
        &self.policy
    }

    /// Returns true once [`validate`](Self::validate) has succeeded.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.backoff.is_some()
    }

    /// The resolved backoff function, once validated.
    #[must_use]
    pub const fn backoff(&self) -> Option<BackoffPolicy> {
        self.backoff
    }

    /// Wraps `transport` in a client that retries according to this policy.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::NotValidated`] unless [`validate`](Self::validate)
    /// has succeeded.
    pub fn build_client<H: HttpClient>(&self, transport: H) -> Result<RetryingClient<H>, RetryError> {
        let backoff = self.backoff.ok_or(RetryError::NotValidated)?;
        let max_attempts = u32::try_from(self.max_attempts).unwrap_or(u32::MAX);
        Ok(RetryingClient::new(
            transport,
            self.wait_min,
            self.wait_max,
            max_attempts,
            backoff,
        ))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

fn human_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}
