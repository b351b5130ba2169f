//! Endpoint URL finalization.

use std::fmt;

use url::Url;

use super::defaults;
use super::error::{ConfigError, EndpointError};
use super::secret::ValueOrPath;

/// Port value meaning "leave the port out of the URL".
///
/// Port 0 is a valid system port, so the sentinel lies above the 16-bit range.
pub const NO_PORT: u64 = 99_999;

/// Largest valid port number.
pub const MAX_PORT: u64 = u16::MAX as u64;

/// Scheme, host, port, and credentials of a remote service.
///
/// Credentials never appear in the URL; the HTTP layer applies them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    /// `http` or `https`, any case
    pub scheme: String,
    /// Host name, optionally followed by `/path`
    pub host: String,
    /// Port number, or [`NO_PORT`]
    pub port: u64,
    /// Basic auth user - value or filename
    pub username: String,
    /// Basic auth password - value or filename
    pub password: String,
    /// Encrypted password reference, passed through as-is
    pub encrypted_password: String,
    url: Option<String>,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("encrypted_password", &redacted(&self.encrypted_password))
            .field("url", &self.url)
            .finish()
    }
}

const fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "***" }
}

impl Endpoint {
    /// Creates an endpoint with no credentials.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u64) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// The canonical URL, once finalized. `None` for an unconfigured endpoint.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns true if scheme and host are both set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.scheme.is_empty() && !self.host.is_empty()
    }

    /// Validates the endpoint and computes its canonical URL.
    ///
    /// - Neither scheme nor host set: nothing to do, the endpoint is unused.
    /// - Only one of them set: [`EndpointError::Incomplete`].
    /// - Otherwise the scheme must be http or https, and the port is left out
    ///   when it is the scheme's default or [`NO_PORT`].
    ///
    /// A `/path` suffix of the host becomes the URL path. The part before it
    /// must be a bare host name: ports go in `port`, and query, fragment, or
    /// userinfo markers are rejected.
    ///
    /// # Errors
    ///
    /// Returns an [`EndpointError`] describing the first problem found.
    pub fn finalize(&mut self) -> Result<(), EndpointError> {
        match (self.scheme.is_empty(), self.host.is_empty()) {
            (true, true) => return Ok(()),
            (false, false) => {}
            _ => return Err(EndpointError::Incomplete),
        }

        let scheme = self.scheme.to_lowercase();
        let default_port = match scheme.as_str() {
            "http" => defaults::HTTP_PORT,
            "https" => defaults::HTTPS_PORT,
            _ => return Err(EndpointError::InvalidScheme(self.scheme.clone())),
        };

        let (host, path) = match self.host.split_once('/') {
            Some((host, path)) => (host, path),
            None => (self.host.as_str(), ""),
        };
        if host.is_empty() || host.contains([':', '?', '#', '@']) {
            return Err(EndpointError::InvalidHost(self.host.clone()));
        }

        let mut composed = format!("{scheme}://{host}");
        if self.port != NO_PORT && self.port != default_port {
            if self.port > MAX_PORT {
                return Err(EndpointError::InvalidPort {
                    port: self.port,
                    max: MAX_PORT,
                });
            }
            composed.push_str(&format!(":{}", self.port));
        }
        if !path.is_empty() {
            composed.push('/');
            composed.push_str(path);
        }

        let parsed = Url::parse(&composed).map_err(|e| EndpointError::InvalidUrl {
            url: composed.clone(),
            reason: e.to_string(),
        })?;

        let canonical = if path.is_empty() {
            parsed.as_str().strip_suffix('/').unwrap_or(parsed.as_str())
        } else {
            parsed.as_str()
        };
        self.url = Some(canonical.to_string());
        Ok(())
    }

    /// Resolves the basic auth credentials, reading them from files when
    /// the configured values name readable files.
    ///
    /// Returns `None` when no user is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential reference cannot be resolved.
    pub fn basic_auth(&self) -> Result<Option<(String, Option<String>)>, ConfigError> {
        let user = ValueOrPath::resolve(&self.username, false, true)?;
        if user.is_empty() {
            return Ok(None);
        }
        let password = ValueOrPath::resolve(&self.password, false, true)?;
        let password = (!password.is_empty()).then(|| password.value().to_string());
        Ok(Some((user.value().to_string(), password)))
    }
}
