//! Precedence resolution across flags, environment, and the flat file.
//!
//! For each declared parameter the first source that has a value wins:
//!
//! 1. **Flag** typed on the command line
//! 2. **Environment variable** from the parameter's scope
//! 3. **Properties file** entry with the same key
//! 4. **Built-in default**
//!
//! The first three count as *explicit*; only the default does not.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::ConfigError;
use super::cli::Cli;
use super::file::FileLocation;
use super::registry::{Parameter, Registry, Scope, Value, key};

/// A resolved value and whether the user supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting<T> {
    /// The resolved value
    pub value: T,
    /// True if set by flag, environment, or flat file
    pub explicit: bool,
}

impl<T> Setting<T> {
    /// An explicitly supplied value.
    pub const fn explicit(value: T) -> Self {
        Self {
            value,
            explicit: true,
        }
    }

    /// A value that fell back to its default.
    pub const fn default_value(value: T) -> Self {
        Self {
            value,
            explicit: false,
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Flag,
    Env,
    File,
    Default,
}

/// Every declared parameter resolved to a typed value.
#[derive(Debug, Clone, Default)]
pub struct ResolvedParameters {
    values: BTreeMap<&'static str, Setting<Value>>,
    from_file: bool,
}

impl ResolvedParameters {
    /// Returns true if a properties file contributed to resolution.
    #[must_use]
    pub const fn from_file(&self) -> bool {
        self.from_file
    }

    /// Returns the raw setting for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Setting<Value>> {
        self.values.get(key)
    }

    /// Returns a string parameter.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<Setting<String>> {
        self.typed(key, |v| v.as_str().map(str::to_string))
    }

    /// Returns an unsigned integer parameter.
    #[must_use]
    pub fn uint(&self, key: &str) -> Option<Setting<u64>> {
        self.typed(key, Value::as_uint)
    }

    /// Returns a boolean parameter.
    #[must_use]
    pub fn boolean(&self, key: &str) -> Option<Setting<bool>> {
        self.typed(key, Value::as_bool)
    }

    fn typed<T>(&self, key: &str, extract: impl Fn(&Value) -> Option<T>) -> Option<Setting<T>> {
        let setting = self.values.get(key)?;
        extract(&setting.value).map(|value| Setting {
            value,
            explicit: setting.explicit,
        })
    }
}

/// Resolves parameters of a registry against parsed flags.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a Registry,
    cli: &'a Cli,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over a registry and parsed flags.
    #[must_use]
    pub const fn new(registry: &'a Registry, cli: &'a Cli) -> Self {
        Self { registry, cli }
    }

    /// Resolves the config file location from flags and the default-scope
    /// environment only. No file has been read at this point.
    ///
    /// # Errors
    ///
    /// Returns an error if a meta parameter is not registered or not a string.
    pub fn meta(&self) -> Result<FileLocation, ConfigError> {
        let dir = self.meta_value(key::CONFIG_DIR)?;
        let file = self.meta_value(key::CONFIG_FILE)?;
        let declared_type = self.meta_value(key::CONFIG_TYPE)?;
        Ok(FileLocation::new(dir, file, declared_type))
    }

    fn meta_value(&self, key: &'static str) -> Result<String, ConfigError> {
        let raw = self
            .cli
            .flag(key)
            .map(str::to_string)
            .or_else(|| self.registry.binding(Scope::Default)?.lookup(key));

        let value = match raw {
            Some(raw) => raw,
            None => self
                .registry
                .get(key)
                .and_then(|param| param.default.as_str())
                .ok_or_else(|| ConfigError::invalid_value(key, "", "meta parameter is not declared"))?
                .to_string(),
        };
        Ok(value)
    }

    /// Resolves every registered parameter.
    ///
    /// `file` holds the entries of a properties file, if one was read.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a supplied value does not
    /// parse as its parameter's kind.
    pub fn resolve(
        &self,
        file: Option<&HashMap<String, String>>,
    ) -> Result<ResolvedParameters, ConfigError> {
        let values = self
            .registry
            .parameters()
            .map(|param| -> Result<_, ConfigError> {
                let (setting, origin) = self.resolve_one(param, file)?;
                debug!(key = param.key, ?origin, "Resolved parameter");
                Ok((param.key, setting))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(ResolvedParameters {
            values,
            from_file: file.is_some(),
        })
    }

    fn resolve_one(
        &self,
        param: &Parameter,
        file: Option<&HashMap<String, String>>,
    ) -> Result<(Setting<Value>, Origin), ConfigError> {
        let (raw, origin) = if let Some(raw) = self.cli.flag(param.key) {
            (raw.to_string(), Origin::Flag)
        } else if let Some(raw) = self
            .registry
            .binding(param.scope)
            .and_then(|binding| binding.lookup(param.key))
        {
            (raw, Origin::Env)
        } else if let Some(raw) = file.and_then(|entries| entries.get(param.key)) {
            (raw.clone(), Origin::File)
        } else {
            return Ok((Setting::default_value(param.default.clone()), Origin::Default));
        };

        let value = Value::parse(param.kind(), param.key, &raw)?;
        Ok((Setting::explicit(value), origin))
    }
}
