//! Outbound HTTP layer driven by resolved retry policies.
//!
//! This module provides types and traits for:
//! - Building HTTP requests ([`HttpRequest`])
//! - Handling HTTP responses ([`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP transport ([`ReqwestClient`])
//! - Retry policy validation ([`RetryPolicy`], [`BackoffPolicy`])
//! - Retrying client decorator ([`RetryingClient`])

mod backoff;
mod error;
mod http;
mod retry;
mod retrying;
mod transport;

#[cfg(test)]
mod retrying_tests;

pub use backoff::BackoffPolicy;
pub use error::{HttpError, RetryError};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use retry::RetryPolicy;
pub use retrying::{IsRetryable, RetryingClient};
pub use transport::ReqwestClient;
