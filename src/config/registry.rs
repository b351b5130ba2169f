//! Parameter declarations: key, shorthand, default value, and scope.

use std::collections::BTreeMap;
use std::fmt;

use super::ConfigError;
use super::defaults;
use super::env::{EnvBinding, EnvSources};

/// Parameter keys. Flags, environment variables, and properties files all
/// use these names.
pub mod key {
    pub const CONFIG_DIR: &str = "config_dir";
    pub const CONFIG_FILE: &str = "config_file";
    pub const CONFIG_TYPE: &str = "config_type";
    pub const DEBUG: &str = "debug";
    pub const CLUSTER_NAME: &str = "cluster_name";
    pub const PROMETHEUS_SCHEME: &str = "prometheus_protocol";
    pub const PROMETHEUS_HOST: &str = "prometheus_address";
    pub const PROMETHEUS_PORT: &str = "prometheus_port";
    pub const PROMETHEUS_USER: &str = "prometheus_user";
    pub const PROMETHEUS_PASSWORD: &str = "prometheus_password";
    pub const PROMETHEUS_TOKEN: &str = "prometheus_oauth_token";
    pub const CA_CERT: &str = "ca_certificate";
    pub const INCLUDE: &str = "include_list";
    pub const NODE_GROUP_LIST: &str = "node_group_list";
    pub const INTERVAL: &str = "interval";
    pub const INTERVAL_SIZE: &str = "interval_size";
    pub const SAMPLE_RATE: &str = "sample_rate";
    pub const HISTORY: &str = "history";
    pub const OFFSET: &str = "offset";
    pub const DENSIFY_SCHEME: &str = "protocol";
    pub const DENSIFY_HOST: &str = "host";
    pub const DENSIFY_PORT: &str = "port";
    pub const DENSIFY_ENDPOINT: &str = "endpoint";
    pub const DENSIFY_USER: &str = "user";
    pub const DENSIFY_PASSWORD: &str = "password";
    pub const DENSIFY_ENC_PASSWORD: &str = "epassword";
    pub const PROXY_SCHEME: &str = "proxyprotocol";
    pub const PROXY_HOST: &str = "proxyhost";
    pub const PROXY_PORT: &str = "proxyport";
    pub const PROXY_AUTH: &str = "proxyauth";
    pub const PROXY_SERVER: &str = "proxyserver";
    pub const PROXY_DOMAIN: &str = "proxydomain";
    pub const PROXY_USER: &str = "proxyuser";
    pub const PROXY_PASSWORD: &str = "proxypassword";
    pub const PROXY_ENC_PASSWORD: &str = "eproxypassword";
    pub const FILE_PREFIX: &str = "prefix";
}

/// Which environment namespace a parameter binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Unprefixed variables (`INTERVAL`).
    Default,
    /// Variables under the application prefix (`DENSIFY_HOST`).
    Application,
}

/// The kind of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free-form text.
    String,
    /// Unsigned 64-bit integer.
    Uint,
    /// Boolean switch.
    Bool,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Uint => "uint",
            Self::Bool => "bool",
        })
    }
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Uint(u64),
    Bool(bool),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Str(_) => ValueKind::String,
            Self::Uint(_) => ValueKind::Uint,
            Self::Bool(_) => ValueKind::Bool,
        }
    }

    /// Parses a raw string from a flag, variable, or properties file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `raw` is not a valid `kind`.
    pub fn parse(kind: ValueKind, key: &'static str, raw: &str) -> Result<Self, ConfigError> {
        match kind {
            ValueKind::String => Ok(Self::Str(raw.to_string())),
            ValueKind::Uint => raw
                .trim()
                .parse::<u64>()
                .map(Self::Uint)
                .map_err(|e| ConfigError::invalid_value(key, raw, e.to_string())),
            ValueKind::Bool => parse_bool(raw.trim())
                .map(Self::Bool)
                .ok_or_else(|| ConfigError::invalid_value(key, raw, "expected true or false")),
        }
    }

    /// Returns the string payload, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an integer value.
    #[must_use]
    pub const fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Uint(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// A declared parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Unique key
    pub key: &'static str,
    /// Single-character flag
    pub shorthand: char,
    /// Help text
    pub description: &'static str,
    /// Environment namespace
    pub scope: Scope,
    /// Compiled-in default
    pub default: Value,
}

impl Parameter {
    /// Returns the kind of this parameter's values.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.default.kind()
    }
}

/// Holds every declared parameter and the environment sources they bind to.
#[derive(Debug)]
pub struct Registry {
    parameters: BTreeMap<&'static str, Parameter>,
    shorthands: BTreeMap<char, &'static str>,
    sources: EnvSources,
}

impl Registry {
    /// Creates an empty registry over the given environment sources.
    #[must_use]
    pub fn new(sources: EnvSources) -> Self {
        Self {
            parameters: BTreeMap::new(),
            shorthands: BTreeMap::new(),
            sources,
        }
    }

    /// Declares a parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `key` is already registered
    /// - `shorthand` is already taken by another key
    /// - no environment source is bound for `scope`
    pub fn register(
        &mut self,
        key: &'static str,
        shorthand: char,
        description: &'static str,
        scope: Scope,
        default: impl Into<Value>,
    ) -> Result<(), ConfigError> {
        if self.parameters.contains_key(key) {
            return Err(ConfigError::DuplicateKey(key));
        }
        if let Some(existing) = self.shorthands.get(&shorthand) {
            return Err(ConfigError::DuplicateShorthand {
                shorthand,
                key,
                existing: *existing,
            });
        }
        if self.sources.get(scope).is_none() {
            return Err(ConfigError::UnknownScope { scope, key });
        }

        self.shorthands.insert(shorthand, key);
        self.parameters.insert(
            key,
            Parameter {
                key,
                shorthand,
                description,
                scope,
                default: default.into(),
            },
        );
        Ok(())
    }

    /// Looks up a parameter by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Parameter> {
        self.parameters.get(key)
    }

    /// Iterates over all parameters in key order.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    /// Returns the environment binding of a scope.
    #[must_use]
    pub const fn binding(&self, scope: Scope) -> Option<&EnvBinding> {
        self.sources.get(scope)
    }

    /// Builds the registry of every parameter the collector understands.
    ///
    /// # Errors
    ///
    /// Returns an error if `sources` lacks a binding for either scope.
    pub fn standard(sources: EnvSources) -> Result<Self, ConfigError> {
        let mut registry = Self::new(sources);
        registry.register_meta()?;
        registry.register_collection()?;
        registry.register_prometheus()?;
        registry.register_forwarder()?;
        Ok(registry)
    }

    fn register_meta(&mut self) -> Result<(), ConfigError> {
        let d = Scope::Default;
        self.register(key::CONFIG_DIR, 'l', "config file parent directory", d, defaults::CONFIG_DIR)?;
        self.register(key::CONFIG_FILE, 'f', "config file name (without extension)", d, defaults::CONFIG_FILE)?;
        self.register(key::CONFIG_TYPE, 'y', "config file type", d, defaults::CONFIG_TYPE)?;
        self.register(key::DEBUG, 'd', "enable debug-level logging", d, false)?;
        Ok(())
    }

    fn register_collection(&mut self) -> Result<(), ConfigError> {
        let d = Scope::Default;
        self.register(key::CLUSTER_NAME, 'c', "cluster name", d, "")?;
        self.register(
            key::INCLUDE,
            'n',
            "comma-separated list of data to include in collection: cluster, node, container, nodegroup, quota",
            d,
            defaults::INCLUDE_LIST,
        )?;
        self.register(
            key::NODE_GROUP_LIST,
            'g',
            "comma-separated list of label names to check for building node groups",
            d,
            defaults::NODE_GROUP_LIST,
        )?;
        self.register(key::INTERVAL, 'k', "interval unit - days/hours/minutes", d, defaults::INTERVAL)?;
        self.register(
            key::INTERVAL_SIZE,
            'i',
            "interval size to be used for querying - last interval size of interval unit of data",
            d,
            defaults::INTERVAL_SIZE,
        )?;
        self.register(
            key::SAMPLE_RATE,
            'r',
            "rate of sample points to collect (1 sample every sample rate in minutes)",
            d,
            defaults::SAMPLE_RATE,
        )?;
        self.register(
            key::HISTORY,
            'h',
            "time to go back for data collection, works with the interval and interval size settings",
            d,
            defaults::HISTORY,
        )?;
        self.register(
            key::OFFSET,
            'o',
            "amount of units (based on interval value) to offset the data collection backwards in time",
            d,
            defaults::OFFSET,
        )?;
        Ok(())
    }

    fn register_prometheus(&mut self) -> Result<(), ConfigError> {
        let d = Scope::Default;
        self.register(key::PROMETHEUS_SCHEME, 's', "prometheus scheme", d, defaults::PROMETHEUS_SCHEME)?;
        self.register(key::PROMETHEUS_HOST, 'a', "prometheus host", d, "")?;
        self.register(key::PROMETHEUS_PORT, 'p', "prometheus port", d, defaults::PROMETHEUS_PORT)?;
        self.register(key::PROMETHEUS_USER, 'u', "prometheus basic auth user - value or filename", d, "")?;
        self.register(key::PROMETHEUS_PASSWORD, 'w', "prometheus basic auth password - value or filename", d, "")?;
        self.register(key::PROMETHEUS_TOKEN, 't', "prometheus oauth token - value or filename", d, "")?;
        self.register(
            key::CA_CERT,
            'x',
            "path to CA certificate (may be required to pass certificate validation)",
            d,
            "",
        )?;
        Ok(())
    }

    fn register_forwarder(&mut self) -> Result<(), ConfigError> {
        let a = Scope::Application;
        self.register(key::DENSIFY_SCHEME, 'S', "densify scheme", a, defaults::DENSIFY_SCHEME)?;
        self.register(key::DENSIFY_HOST, 'H', "densify host", a, defaults::DENSIFY_HOST)?;
        self.register(key::DENSIFY_PORT, 'P', "densify port", a, defaults::DENSIFY_PORT)?;
        self.register(key::DENSIFY_ENDPOINT, 'N', "densify endpoint", a, defaults::DENSIFY_ENDPOINT)?;
        self.register(key::DENSIFY_USER, 'U', "densify user - value or filename", a, "")?;
        self.register(key::DENSIFY_PASSWORD, 'W', "densify password - value or filename", a, "")?;
        self.register(key::DENSIFY_ENC_PASSWORD, 'E', "encrypted densify password - value or filename", a, "")?;
        self.register(key::PROXY_SCHEME, 'T', "proxy scheme", a, "")?;
        self.register(key::PROXY_HOST, 'G', "proxy host", a, "")?;
        self.register(key::PROXY_PORT, 'Q', "proxy port", a, defaults::PROXY_PORT)?;
        self.register(key::PROXY_AUTH, 'A', "proxy auth", a, defaults::PROXY_AUTH)?;
        self.register(key::PROXY_SERVER, 'R', "proxy server", a, "")?;
        self.register(key::PROXY_DOMAIN, 'D', "proxy domain", a, "")?;
        self.register(key::PROXY_USER, 'V', "proxy user - value or filename", a, "")?;
        self.register(key::PROXY_PASSWORD, 'X', "proxy password - value or filename", a, "")?;
        self.register(key::PROXY_ENC_PASSWORD, 'F', "encrypted proxy password - value or filename", a, "")?;
        self.register(key::FILE_PREFIX, 'I', "zip file prefix", a, "")?;
        Ok(())
    }
}
