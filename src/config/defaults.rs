//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default directory searched for the config file.
pub const CONFIG_DIR: &str = "./config";

/// Default config file name (without extension).
pub const CONFIG_FILE: &str = "config";

/// Default config file type.
pub const CONFIG_TYPE: &str = "properties";

/// Default upstream data-source scheme.
pub const PROMETHEUS_SCHEME: &str = "http";

/// Default upstream data-source port.
pub const PROMETHEUS_PORT: u64 = 9090;

/// Default data categories to collect.
pub const INCLUDE_LIST: &str = "container,node,cluster,nodegroup,quota";

/// Default label names checked when building node groups, in priority order.
pub const NODE_GROUP_LIST: &str = "label_karpenter_sh_nodepool,label_cloud_google_com_gke_nodepool,\
label_eks_amazonaws_com_nodegroup,label_agentpool,label_pool_name,\
label_alpha_eksctl_io_nodegroup_name,label_kops_k8s_io_instancegroup";

/// Default collection interval unit.
pub const INTERVAL: &str = "hours";

/// Default interval size.
pub const INTERVAL_SIZE: u64 = 1;

/// Default sample rate in minutes.
pub const SAMPLE_RATE: u64 = 5;

/// Default history depth in intervals.
pub const HISTORY: u64 = 1;

/// Default offset in intervals.
pub const OFFSET: u64 = 0;

/// Default forwarder destination scheme.
pub const DENSIFY_SCHEME: &str = "https";

/// Default forwarder destination host.
pub const DENSIFY_HOST: &str = "localhost";

/// Default forwarder destination port.
pub const DENSIFY_PORT: u64 = HTTPS_PORT;

/// Default forwarder API path.
pub const DENSIFY_ENDPOINT: &str = "/api/v2/";

/// Default proxy port.
pub const PROXY_PORT: u64 = HTTPS_PORT;

/// Default proxy authentication scheme.
pub const PROXY_AUTH: &str = "Basic";

/// Conventional port of the http scheme.
pub const HTTP_PORT: u64 = 80;

/// Conventional port of the https scheme.
pub const HTTPS_PORT: u64 = 443;

/// Prefix of application-scoped environment variables.
pub const APPLICATION_ENV_PREFIX: &str = "DENSIFY";

/// Default output path of the `init` subcommand.
pub const TEMPLATE_OUTPUT: &str = "config.yaml";

/// Default minimum wait between retries.
pub const RETRY_WAIT_MIN: Duration = Duration::from_secs(1);

/// Default maximum wait between retries.
pub const RETRY_WAIT_MAX: Duration = Duration::from_secs(30);

/// Default number of attempts (including the first).
pub const RETRY_MAX_ATTEMPTS: i64 = 4;
