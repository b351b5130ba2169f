//! Production HTTP transport using reqwest.

use tracing::{debug, warn};

use crate::config::{ConfigError, ProxySettings};

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Production HTTP client using reqwest.
///
/// A thin wrapper around `reqwest::Client` implementing [`HttpClient`].
/// It is the transport a [`RetryingClient`](super::RetryingClient) wraps.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Creates an HTTP client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Creates an HTTP client from an existing reqwest client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }

    /// Creates an HTTP client that routes through the forwarder proxy.
    ///
    /// An unconfigured proxy yields a direct client. Only Basic proxy
    /// authentication is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy URL is rejected, a credential reference
    /// cannot be resolved, or the client cannot be built.
    pub fn with_proxy(proxy: &ProxySettings) -> Result<Self, ConfigError> {
        let Some(url) = proxy.url.url() else {
            return Ok(Self::new());
        };

        let mut reqwest_proxy = reqwest::Proxy::all(url).map_err(|e| invalid_proxy(url, &e))?;

        if let Some((user, password)) = proxy.url.basic_auth()? {
            if proxy.auth.eq_ignore_ascii_case("basic") {
                reqwest_proxy = reqwest_proxy.basic_auth(&user, password.as_deref().unwrap_or(""));
            } else {
                warn!(auth = %proxy.auth, "Unsupported proxy authentication scheme; sending no credentials");
            }
        }

        let client = reqwest::Client::builder()
            .proxy(reqwest_proxy)
            .build()
            .map_err(|e| invalid_proxy(url, &e))?;

        debug!(proxy = url, "Routing requests through proxy");
        Ok(Self::from_client(client))
    }
}

fn invalid_proxy(url: &str, e: &reqwest::Error) -> ConfigError {
    ConfigError::invalid_value(crate::config::key::PROXY_HOST, url, e.to_string())
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.inner.request(req.method, req.url.as_str());

        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else if e.is_builder() {
                HttpError::InvalidUrl(e.to_string())
            } else {
                HttpError::Connection(Box::new(e))
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::Connection(Box::new(e)))?
            .to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}
