//! Collector configuration tool.
//!
//! Entry point for the collector-config application.

use collector_config::client::ReqwestClient;
use collector_config::config::{
    Cli, Command, ConfigError, EnvSources, Registry, ValidatedConfig, field, write_default_config,
};
use std::process::ExitCode;

mod app;

use app::{exit_code, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let registry = match Registry::standard(EnvSources::process()) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {e}");
            return exit_code::CONFIG_ERROR;
        }
    };

    let cli = match Cli::parse_args(&registry) {
        Ok(cli) => cli,
        // clap prints help or usage and picks the exit code
        Err(ConfigError::Flags(e)) => e.exit(),
        Err(e) => {
            eprintln!("Error: {e}");
            return exit_code::CONFIG_ERROR;
        }
    };

    // Handle init subcommand
    if let Some(Command::Init { output }) = &cli.command {
        return handle_init(output);
    }

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli, &registry) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    setup_tracing(config.debug);
    tracing::info!("{config}");

    match build_clients(&config) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("Client setup error: {e}");
            exit_code::runtime_error()
        }
    }
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Builds the forwarder and data-source clients from the validated policies.
fn build_clients(config: &ValidatedConfig) -> Result<(), ConfigError> {
    let forwarder = &config.forwarder;
    let transport = ReqwestClient::with_proxy(&forwarder.proxy)?;
    let densify = forwarder
        .densify
        .retry
        .build_client(transport)
        .map_err(|source| ConfigError::Retry {
            field: field::DENSIFY_RETRY,
            source,
        })?;

    let prometheus = config
        .prometheus
        .retry
        .build_client(ReqwestClient::new())
        .map_err(|source| ConfigError::Retry {
            field: field::PROMETHEUS_RETRY,
            source,
        })?;

    let densify_auth = forwarder.densify.url.basic_auth()?.is_some();
    let prometheus_auth = config.prometheus.url.basic_auth()?.is_some();
    let prometheus_token = config.prometheus.resolve_bearer_token()?.is_some();
    if let Some(ca_cert) = config.prometheus.resolve_ca_cert()? {
        tracing::debug!(path = %ca_cert.display(), "Using CA certificate for the data source");
    }

    tracing::info!(
        densify_attempts = densify.max_attempts(),
        densify_backoff = %densify.backoff(),
        densify_auth,
        prometheus_attempts = prometheus.max_attempts(),
        prometheus_backoff = %prometheus.backoff(),
        prometheus_auth,
        prometheus_token,
        "HTTP clients ready"
    );
    Ok(())
}
