//! Configuration layer for the collector.
//!
//! This module provides:
//! - Parameter declarations ([`Registry`], [`key`])
//! - Flag parsing ([`Cli`], [`Command`])
//! - Environment variable scopes ([`EnvSources`], [`EnvBinding`])
//! - Precedence resolution ([`Resolver`], [`ResolvedParameters`])
//! - Properties and YAML config files ([`FileLocation`], [`YamlConfig`])
//! - Endpoint URL finalization ([`Endpoint`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Each parameter is resolved with the following priority (highest to lowest):
//!
//! 1. **Flags** - Values passed on the command line
//! 2. **Environment variables** - `KEY` for default-scope parameters,
//!    `DENSIFY_KEY` for application-scope parameters
//! 3. **Properties file** - Entries of the flat config file
//! 4. **Built-in defaults** - Hardcoded default values
//!
//! The config file location itself (`config_dir`, `config_file`,
//! `config_type`) is resolved from flags and the default-scope environment
//! before any file is read.
//!
//! # YAML Files
//!
//! A YAML file is parsed on its own and merged afterwards. Its values beat
//! built-in defaults but lose to any value supplied by flag or environment
//! variable. Supplying both a YAML file and a properties file is an error.
//!
//! For `include_list`, an explicitly supplied value **replaces** the YAML
//! list entirely. Its default never fills an omitted YAML include.
//! A supplied `cluster_name` is **appended** to the YAML cluster list.

mod cli;
pub mod defaults;
mod endpoint;
mod env;
mod error;
mod file;
mod merge;
mod registry;
mod resolver;
mod secret;
mod validated;
mod yaml;

#[cfg(test)]
mod file_tests;
#[cfg(test)]
mod merge_tests;

pub use cli::{Cli, Command};
pub use endpoint::{Endpoint, MAX_PORT, NO_PORT};
pub use env::{EnvBinding, EnvSource, EnvSources, ProcessEnv};
pub use error::{ConfigError, EndpointError, field};
pub use file::{FileLocation, FileStyle, read_properties};
pub use merge::merge;
pub use registry::{Parameter, Registry, Scope, Value, ValueKind, key};
pub use resolver::{ResolvedParameters, Resolver, Setting};
pub use secret::ValueOrPath;
pub use validated::{
    CollectionSettings, DensifySettings, ForwarderSettings, IntervalUnit, PrometheusSettings,
    ProxySettings, ValidatedConfig, write_default_config,
};
pub use yaml::{
    ClusterFilter, CollectionSection, DensifySection, EndpointSection, ForwarderSection,
    IncludeSpec, PrometheusSection, ProxySection, SigV4Config, YamlConfig, default_config_template,
};
