//! Collector configuration resolution.
//!
//! Resolves the configuration of a metrics collector/forwarder from flags,
//! environment variables, and a YAML or properties file into one validated
//! snapshot, and builds retrying HTTP clients from its retry policies.

pub mod client;
pub mod config;
pub mod time;
