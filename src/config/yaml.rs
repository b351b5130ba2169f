//! YAML configuration file parsing.
//!
//! Defines the structured file with serde. Every scalar is optional so the
//! merger can tell "omitted" apart from "set to zero or empty".

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::client::RetryPolicy;

use super::ConfigError;

/// Root of the structured configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlConfig {
    /// Forwarder section
    #[serde(default)]
    pub forwarder: ForwarderSection,

    /// Upstream data-source section
    #[serde(default)]
    pub prometheus: PrometheusSection,

    /// Collection section
    #[serde(default)]
    pub collection: CollectionSection,

    /// Cluster filters
    pub clusters: Option<Vec<ClusterFilter>>,

    /// Enable debug-level logging
    pub debug: Option<bool>,
}

/// Scheme, host, port, and credentials of an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSection {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u64>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub encrypted_password: Option<String>,
}

/// Forwarder configuration section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForwarderSection {
    /// Destination service
    #[serde(default)]
    pub densify: DensifySection,

    /// Outbound proxy
    #[serde(default)]
    pub proxy: ProxySection,

    /// Output file name prefix
    pub prefix: Option<String>,
}

/// Forwarder destination section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DensifySection {
    #[serde(default)]
    pub url: EndpointSection,
    pub endpoint: Option<String>,
    pub retry: Option<RetryPolicy>,
}

/// Proxy section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxySection {
    #[serde(default)]
    pub url: EndpointSection,
    pub auth: Option<String>,
    pub server: Option<String>,
    pub domain: Option<String>,
}

/// Upstream data-source section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusSection {
    #[serde(default)]
    pub url: EndpointSection,
    pub bearer_token: Option<String>,
    pub ca_cert: Option<String>,
    pub sigv4: Option<SigV4Config>,
    pub retry: Option<RetryPolicy>,
}

/// AWS signature v4 settings, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigV4Config {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub role_arn: String,
}

/// Collection section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionSection {
    pub include: Option<IncludeSpec>,
    pub interval: Option<String>,
    pub interval_size: Option<u64>,
    pub history: Option<u64>,
    pub offset: Option<u64>,
    pub sample_rate: Option<u64>,
    pub node_group_list: Option<String>,
}

/// Data categories to collect: `[node, container]` or `{node: true, quota: false}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IncludeSpec {
    List(Vec<String>),
    Map(BTreeMap<String, bool>),
}

impl IncludeSpec {
    /// Lower-cased set of enabled categories.
    #[must_use]
    pub fn to_set(&self) -> BTreeSet<String> {
        let names: Vec<&String> = match self {
            Self::List(items) => items.iter().collect(),
            Self::Map(items) => items
                .iter()
                .filter(|(_, enabled)| **enabled)
                .map(|(name, _)| name)
                .collect(),
        };
        names
            .into_iter()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// A cluster selected by name and label identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterFilter {
    /// Cluster name
    #[serde(default)]
    pub name: String,

    /// Label selectors identifying the cluster's series
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
}

impl YamlConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config = Self::parse(&content).map_err(|source| ConfigError::YamlParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded YAML config file");
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the YAML is invalid.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r"# Collector configuration file
# Load it with: --config_type yaml --config_file config
# Flags and environment variables still override values set here.

forwarder:
  densify:
    url:
      scheme: https
      host: localhost
      port: 443
      # username: /var/secrets/user      # value or filename
      # password: /var/secrets/password  # value or filename
      # encrypted_password: ''
    endpoint: /api/v2/
    # retry:
    #   wait_min: 1s
    #   wait_max: 30s
    #   max_attempts: 4
    #   policy: default                  # default, exponential, or jitter
  # proxy:
  #   url:
  #     scheme: http
  #     host: proxy.example.com
  #     port: 3128
  #   auth: Basic
  # prefix: ''

prometheus:
  url:
    scheme: http
    host: prometheus.example.com
    port: 9090
  # bearer_token: /var/run/secrets/token
  # ca_cert: /etc/ssl/ca.pem
  # retry:
  #   wait_min: 1s
  #   wait_max: 30s
  #   max_attempts: 4

collection:
  include:
    - container
    - node
    - cluster
    - nodegroup
    - quota
  interval: hours
  interval_size: 1
  history: 1
  offset: 0
  sample_rate: 5
  # node_group_list: label_karpenter_sh_nodepool,label_eks_amazonaws_com_nodegroup

# clusters:
#   - name: production
#     identifiers:
#       cluster: prod-east

debug: false
"
    .to_string()
}
