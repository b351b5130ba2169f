//! CLI argument parsing using clap.
//!
//! The command line is generated from the [`Registry`]: every parameter
//! becomes `--<key>` with its single-character shorthand. Flags carry no
//! clap defaults, so a value is present here only when the user typed it.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches};

use super::ConfigError;
use super::defaults;
use super::registry::{Registry, ValueKind};

const INIT: &str = "init";
const OUTPUT: &str = "output";

/// Subcommands of the collector configuration tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate a YAML configuration template.
    Init {
        /// Output path for the configuration file
        output: PathBuf,
    },
}

/// Flag values typed on the command line, plus an optional subcommand.
#[derive(Debug, Clone, Default)]
pub struct Cli {
    /// Subcommand to run
    pub command: Option<Command>,
    flags: HashMap<String, String>,
}

impl Cli {
    /// Builds the clap command for a registry.
    #[must_use]
    pub fn command(registry: &Registry) -> clap::Command {
        // `-h` belongs to `history`, so help is long-only and there is no `-V`.
        let mut cmd = clap::Command::new("collector-config")
            .about("Resolves collector and forwarder configuration")
            .disable_help_flag(true)
            .disable_help_subcommand(true)
            .arg(
                Arg::new("help")
                    .long("help")
                    .action(ArgAction::Help)
                    .help("Print help"),
            )
            .subcommand(
                clap::Command::new(INIT)
                    .about("Generate a default YAML configuration file")
                    .arg(
                        Arg::new(OUTPUT)
                            .long(OUTPUT)
                            .short('o')
                            .value_name("PATH")
                            .default_value(defaults::TEMPLATE_OUTPUT)
                            .help("Output path for the configuration file"),
                    ),
            );

        for param in registry.parameters() {
            let arg = Arg::new(param.key)
                .long(param.key)
                .short(param.shorthand)
                .help(param.description)
                .action(ArgAction::Set);

            let arg = match param.kind() {
                // `--debug` alone means true; `--debug=false` is also accepted
                ValueKind::Bool => arg
                    .num_args(0..=1)
                    .require_equals(true)
                    .default_missing_value("true")
                    .value_name("BOOL"),
                ValueKind::Uint => arg.value_name("UINT"),
                ValueKind::String => arg.value_name("STRING"),
            };
            cmd = cmd.arg(arg);
        }

        cmd
    }

    /// Parses CLI arguments from the process command line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Flags`] on unknown flags, missing values, or `--help`.
    pub fn parse_args(registry: &Registry) -> Result<Self, ConfigError> {
        Self::parse_from_iter(registry, std::env::args_os())
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    ///
    /// The first item is the program name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Flags`] on unknown flags, missing values, or `--help`.
    pub fn parse_from_iter<I, T>(registry: &Registry, iter: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command(registry).try_get_matches_from(iter)?;

        let flags = registry
            .parameters()
            .filter_map(|param| {
                matches
                    .get_one::<String>(param.key)
                    .map(|value| (param.key.to_string(), value.clone()))
            })
            .collect();

        Ok(Self {
            command: parse_command(&matches),
            flags,
        })
    }

    /// Returns the raw value typed for a key, if any.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<&str> {
        self.flags.get(key).map(String::as_str)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}

fn parse_command(matches: &ArgMatches) -> Option<Command> {
    match matches.subcommand() {
        Some((INIT, sub)) => Some(Command::Init {
            output: sub
                .get_one::<String>(OUTPUT)
                .map_or_else(|| PathBuf::from(defaults::TEMPLATE_OUTPUT), PathBuf::from),
        }),
        _ => None,
    }
}
