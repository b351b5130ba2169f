//! Error types for configuration resolution and validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::client::RetryError;

use super::registry::Scope;

/// Error type for configuration operations.
///
/// Every validator fails fast: the first error aborts loading and no
/// partially resolved configuration is handed back.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the YAML configuration.
    #[error("Failed to parse YAML config '{}': {source}", path.display())]
    YamlParse {
        /// Path to the config file
        path: PathBuf,
        /// Underlying decoder error
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to parse the properties configuration.
    #[error("Failed to parse properties config '{}': {source}", path.display())]
    PropertiesParse {
        /// Path to the config file
        path: PathBuf,
        /// Underlying decoder error
        #[source]
        source: java_properties::PropertiesError,
    },

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Command-line flags could not be parsed (also carries `--help`).
    #[error(transparent)]
    Flags(#[from] clap::Error),

    /// A parameter key was registered twice.
    #[error("Duplicate parameter key '{0}'")]
    DuplicateKey(&'static str),

    /// Two parameters share the same single-character flag.
    #[error("Shorthand '-{shorthand}' of '{key}' is already used by '{existing}'")]
    DuplicateShorthand {
        /// The colliding shorthand
        shorthand: char,
        /// The key being registered
        key: &'static str,
        /// The key that owns the shorthand
        existing: &'static str,
    },

    /// A parameter was registered under a scope with no bound environment source.
    #[error("No environment source bound for scope {scope:?} (parameter '{key}')")]
    UnknownScope {
        /// The requested scope
        scope: Scope,
        /// The parameter key
        key: &'static str,
    },

    /// A raw flag, environment, or file value could not be parsed.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Parameter key
        key: &'static str,
        /// The raw value
        value: String,
        /// Reason for invalidity
        reason: String,
    },

    /// A structured file and a flat file were both supplied.
    #[error("YAML configuration and properties configuration are mutually exclusive")]
    ConflictingConfigStyles,

    /// An endpoint failed URL finalization.
    #[error("Invalid endpoint {field}: {source}")]
    Endpoint {
        /// Location of the endpoint in the configuration
        field: &'static str,
        /// What was wrong with it
        #[source]
        source: EndpointError,
    },

    /// A retry policy failed validation.
    #[error("Invalid retry configuration {field}: {source}")]
    Retry {
        /// Location of the policy in the configuration
        field: &'static str,
        /// What was wrong with it
        #[source]
        source: RetryError,
    },

    /// Collection interval unit is not recognized.
    #[error("Invalid interval '{0}': expected days, hours, or minutes")]
    InvalidInterval(String),

    /// A numeric value does not fit its derived representation.
    #[error("Value {value} for {field} is out of range")]
    OutOfRange {
        /// Name of the field
        field: &'static str,
        /// The offending value
        value: u64,
    },

    /// A file-only secret reference could not be read.
    #[error("Failed to read secret file '{}': {source}", path.display())]
    SecretRead {
        /// Path to the secret file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Error type for endpoint URL finalization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// Only one of scheme and host was provided.
    #[error("scheme and host must both be set or both be empty")]
    Incomplete,

    /// Scheme is not http or https.
    #[error("invalid scheme '{0}': expected http or https")]
    InvalidScheme(String),

    /// Port does not fit in 16 bits and is not the ignore-port sentinel.
    #[error("invalid port number: {port} > {max}")]
    InvalidPort {
        /// The configured port
        port: u64,
        /// Largest valid port
        max: u64,
    },

    /// The host segment is empty or carries a port, query, fragment, or user.
    #[error("invalid host '{0}': expected a host name optionally followed by /path")]
    InvalidHost(String),

    /// The composed URL could not be parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The composed URL string
        url: String,
        /// Parser message
        reason: String,
    },
}

/// Well-known endpoint and policy locations used in error context.
pub mod field {
    /// The forwarder destination endpoint.
    pub const DENSIFY_URL: &str = "forwarder.densify.url";
    /// The forwarder retry policy.
    pub const DENSIFY_RETRY: &str = "forwarder.densify.retry";
    /// The forwarder proxy endpoint.
    pub const PROXY_URL: &str = "forwarder.proxy.url";
    /// The upstream data-source endpoint.
    pub const PROMETHEUS_URL: &str = "prometheus.url";
    /// The upstream data-source retry policy.
    pub const PROMETHEUS_RETRY: &str = "prometheus.retry";
}

impl ConfigError {
    /// Creates an `InvalidValue` error.
    pub fn invalid_value(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
