//! Validated configuration after merging every source.
//!
//! This module contains the final configuration that is handed to the
//! rest of the application. All validation happens during construction:
//! endpoints are finalized, retry policies validated, and derived values
//! computed, or loading fails with the first error found.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::client::RetryPolicy;

use super::cli::Cli;
use super::endpoint::Endpoint;
use super::error::{ConfigError, field};
use super::file::{FileStyle, read_properties};
use super::merge::merge;
use super::registry::Registry;
use super::resolver::Resolver;
use super::secret::ValueOrPath;
use super::yaml::{
    ClusterFilter, CollectionSection, DensifySection, EndpointSection, ForwarderSection,
    IncludeSpec, PrometheusSection, ProxySection, SigV4Config, YamlConfig,
};

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::load`] to resolve flags, environment variables, and
/// the config file, or [`ValidatedConfig::from_document`] to finalize an
/// already merged document.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Forwarder destination, proxy, and file naming
    pub forwarder: ForwarderSettings,

    /// Upstream data source
    pub prometheus: PrometheusSettings,

    /// What to collect and over which window
    pub collection: CollectionSettings,

    /// Cluster filters
    pub clusters: Vec<ClusterFilter>,

    /// Debug-level logging enabled
    pub debug: bool,
}

/// Forwarder settings.
#[derive(Debug, Clone)]
pub struct ForwarderSettings {
    /// Destination service
    pub densify: DensifySettings,
    /// Outbound proxy
    pub proxy: ProxySettings,
    /// Output file name prefix
    pub prefix: String,
}

/// Forwarder destination settings.
#[derive(Debug, Clone)]
pub struct DensifySettings {
    /// Destination endpoint
    pub url: Endpoint,
    /// API path on the destination
    pub endpoint: String,
    /// Validated retry policy
    pub retry: RetryPolicy,
}

/// Proxy settings.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    /// Proxy endpoint; unconfigured means direct connections
    pub url: Endpoint,
    /// Authentication scheme (`Basic`, `NTLM`, ...)
    pub auth: String,
    /// Authentication server
    pub server: String,
    /// Authentication domain
    pub domain: String,
}

/// Upstream data-source settings.
#[derive(Clone)]
pub struct PrometheusSettings {
    /// Data-source endpoint
    pub url: Endpoint,
    /// OAuth bearer token - value or filename
    pub bearer_token: String,
    /// CA certificate filename
    pub ca_cert: String,
    /// AWS signature v4 settings
    pub sigv4: Option<SigV4Config>,
    /// Validated retry policy
    pub retry: RetryPolicy,
}

impl fmt::Debug for PrometheusSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrometheusSettings")
            .field("url", &self.url)
            .field("bearer_token", &!self.bearer_token.is_empty())
            .field("ca_cert", &self.ca_cert)
            .field("sigv4", &self.sigv4.as_ref().map(|s| &s.region))
            .field("retry", &self.retry)
            .finish()
    }
}

/// Collection window unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    Days,
    Hours,
    Minutes,
}

impl IntervalUnit {
    /// Parses `days`, `hours`, or `minutes` (singular accepted, any case).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "days" | "day" => Some(Self::Days),
            "hours" | "hour" => Some(Self::Hours),
            "minutes" | "minute" => Some(Self::Minutes),
            _ => None,
        }
    }

    /// Canonical plural name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Hours => "hours",
            Self::Minutes => "minutes",
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection settings, with mirrors derived for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSettings {
    /// Data categories to collect (lower-case)
    pub include: BTreeSet<String>,
    /// Window unit
    pub interval: IntervalUnit,
    /// Window size in units
    pub interval_size: u64,
    /// How many windows back to collect
    pub history: u64,
    /// Signed mirror of `history`
    pub history_i64: i64,
    /// How many units to shift the collection back in time
    pub offset: u64,
    /// Signed mirror of `offset`
    pub offset_i64: i64,
    /// Minutes between sample points
    pub sample_rate: u64,
    /// Decimal string mirror of `sample_rate`
    pub sample_rate_label: String,
    /// Raw comma-separated node-group label list
    pub node_group_list: String,
    /// Node-group labels in priority order, lower-case and de-duplicated
    pub node_group_labels: Vec<String>,
}

impl ValidatedConfig {
    /// Resolves flags, environment variables, and the config file.
    ///
    /// The config file is located from the meta parameters first; a YAML
    /// file is parsed on its own and merged with the flat sources, while a
    /// properties file feeds precedence resolution directly.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A YAML config file cannot be read or parsed
    /// - A properties file exists but cannot be read or parsed
    /// - A supplied value does not parse as its parameter's kind
    /// - Both config styles contribute values
    /// - An endpoint, retry policy, or collection setting is invalid
    pub fn load(cli: &Cli, registry: &Registry) -> Result<Self, ConfigError> {
        let resolver = Resolver::new(registry, cli);
        let location = resolver.meta()?;
        let path = location.path();

        let (hierarchy, properties) = match location.style() {
            FileStyle::Structured => (Some(YamlConfig::load(&path)?), None),
            FileStyle::Flat => (None, read_properties(&path)?),
            FileStyle::Unknown => {
                debug!(path = %path.display(), "Config file type not recognized; skipping file");
                (None, None)
            }
        };

        let flat = resolver.resolve(properties.as_ref())?;
        merge(hierarchy, &flat)
    }

    /// Finalizes a merged document.
    ///
    /// Omitted values become empty or zero; callers normally go through
    /// [`load`](Self::load), which fills them from flat sources first.
    ///
    /// # Errors
    ///
    /// Returns the first endpoint, retry policy, or collection error found.
    pub fn from_document(doc: YamlConfig) -> Result<Self, ConfigError> {
        let collection = CollectionSettings::finalize(doc.collection)?;
        let forwarder = ForwarderSettings::finalize(doc.forwarder)?;
        let prometheus = PrometheusSettings::finalize(doc.prometheus)?;

        Ok(Self {
            forwarder,
            prometheus,
            collection,
            clusters: doc.clusters.unwrap_or_default(),
            debug: doc.debug.unwrap_or(false),
        })
    }
}

impl ForwarderSettings {
    fn finalize(section: ForwarderSection) -> Result<Self, ConfigError> {
        let ForwarderSection {
            densify,
            proxy,
            prefix,
        } = section;

        Ok(Self {
            densify: DensifySettings::finalize(densify)?,
            proxy: ProxySettings::finalize(proxy)?,
            prefix: prefix.unwrap_or_default(),
        })
    }
}

impl DensifySettings {
    fn finalize(section: DensifySection) -> Result<Self, ConfigError> {
        Ok(Self {
            url: finalize_endpoint(section.url, field::DENSIFY_URL)?,
            endpoint: section.endpoint.unwrap_or_default(),
            retry: validate_retry(section.retry, field::DENSIFY_RETRY)?,
        })
    }
}

impl ProxySettings {
    fn finalize(section: ProxySection) -> Result<Self, ConfigError> {
        Ok(Self {
            url: finalize_endpoint(section.url, field::PROXY_URL)?,
            auth: section.auth.unwrap_or_default(),
            server: section.server.unwrap_or_default(),
            domain: section.domain.unwrap_or_default(),
        })
    }
}

impl PrometheusSettings {
    fn finalize(section: PrometheusSection) -> Result<Self, ConfigError> {
        Ok(Self {
            url: finalize_endpoint(section.url, field::PROMETHEUS_URL)?,
            bearer_token: section.bearer_token.unwrap_or_default(),
            ca_cert: section.ca_cert.unwrap_or_default(),
            sigv4: section.sigv4,
            retry: validate_retry(section.retry, field::PROMETHEUS_RETRY)?,
        })
    }

    /// Resolves the bearer token, reading it from a file when the setting
    /// names a readable one. `None` when no token is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the token reference cannot be resolved.
    pub fn resolve_bearer_token(&self) -> Result<Option<String>, ConfigError> {
        let token = ValueOrPath::resolve(&self.bearer_token, false, true)?;
        Ok((!token.is_empty()).then(|| token.value().to_string()))
    }

    /// Resolves the CA certificate, which must name an existing file.
    /// `None` when no certificate is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SecretRead`] if the file cannot be accessed.
    pub fn resolve_ca_cert(&self) -> Result<Option<PathBuf>, ConfigError> {
        let cert = ValueOrPath::resolve(&self.ca_cert, true, false)?;
        Ok(cert.path().map(Path::to_path_buf))
    }
}

impl CollectionSettings {
    fn finalize(section: CollectionSection) -> Result<Self, ConfigError> {
        let raw_interval = section.interval.unwrap_or_default();
        let interval =
            IntervalUnit::parse(&raw_interval).ok_or(ConfigError::InvalidInterval(raw_interval))?;

        let history = section.history.unwrap_or_default();
        let offset = section.offset.unwrap_or_default();
        let sample_rate = section.sample_rate.unwrap_or_default();
        let node_group_list = section.node_group_list.unwrap_or_default();

        Ok(Self {
            include: section
                .include
                .as_ref()
                .map_or_else(BTreeSet::new, IncludeSpec::to_set),
            interval,
            interval_size: section.interval_size.unwrap_or_default(),
            history,
            history_i64: signed_mirror("history", history)?,
            offset,
            offset_i64: signed_mirror("offset", offset)?,
            sample_rate,
            sample_rate_label: sample_rate.to_string(),
            node_group_labels: ordered_labels(&node_group_list),
            node_group_list,
        })
    }
}

fn finalize_endpoint(section: EndpointSection, field: &'static str) -> Result<Endpoint, ConfigError> {
    let mut endpoint = Endpoint::new(
        section.scheme.unwrap_or_default(),
        section.host.unwrap_or_default(),
        section.port.unwrap_or_default(),
    );
    endpoint.username = section.username.unwrap_or_default();
    endpoint.password = section.password.unwrap_or_default();
    endpoint.encrypted_password = section.encrypted_password.unwrap_or_default();
    endpoint
        .finalize()
        .map_err(|source| ConfigError::Endpoint { field, source })?;
    Ok(endpoint)
}

fn validate_retry(policy: Option<RetryPolicy>, field: &'static str) -> Result<RetryPolicy, ConfigError> {
    let mut policy = policy.unwrap_or_default();
    policy
        .validate()
        .map_err(|source| ConfigError::Retry { field, source })?;
    Ok(policy)
}

fn signed_mirror(field: &'static str, value: u64) -> Result<i64, ConfigError> {
    i64::try_from(value).map_err(|_| ConfigError::OutOfRange { field, value })
}

fn ordered_labels(list: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    list.split(',')
        .map(|label| label.trim().to_lowercase())
        .filter(|label| !label.is_empty() && seen.insert(label.clone()))
        .collect()
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let include: Vec<&str> = self.collection.include.iter().map(String::as_str).collect();

        write!(
            f,
            "Config {{ densify: {}{}, prometheus: {}, proxy: {}, interval: {} {}, history: {}, \
             offset: {}, sample_rate: {}m, include: [{}], clusters: {}, debug: {} }}",
            self.forwarder.densify.url.url().unwrap_or("none"),
            self.forwarder.densify.endpoint,
            self.prometheus.url.url().unwrap_or("none"),
            self.forwarder.proxy.url.url().unwrap_or("none"),
            self.collection.interval_size,
            self.collection.interval,
            self.collection.history,
            self.collection.offset,
            self.collection.sample_rate,
            include.join(","),
            self.clusters.len(),
            self.debug,
        )
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::yaml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
