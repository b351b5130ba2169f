//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use collector_config::config::{ConfigError, EndpointError, field, key};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid flags, values, or files.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - HTTP client setup failure.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::Endpoint {
            field: f,
            source: EndpointError::Incomplete,
        } if *f == field::PROMETHEUS_URL => {
            eprintln!(
                "\nSet the data source with --{} or the {} environment variable.",
                key::PROMETHEUS_HOST,
                key::PROMETHEUS_HOST.to_uppercase(),
            );
        }
        ConfigError::FileRead { .. } | ConfigError::YamlParse { .. } => {
            eprintln!("\nRun 'collector-config init' to generate a configuration template.");
        }
        ConfigError::ConflictingConfigStyles => {
            eprintln!("\nKeep settings in either the YAML file or the properties file, not both.");
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
pub fn setup_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
