//! Environment variable sources, one per [`Scope`].
//!
//! Sources are plain values handed to the [`Registry`](super::Registry)
//! at construction time, so tests can inject an isolated map per scope
//! instead of touching the process environment.

use std::collections::HashMap;
use std::fmt;

use super::defaults;
use super::registry::Scope;

/// Something that can look up an environment variable by its full name.
pub trait EnvSource: Send + Sync {
    /// Returns the variable's value, if set.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// An environment source together with the prefix its keys live under.
pub struct EnvBinding {
    prefix: Option<String>,
    source: Box<dyn EnvSource>,
}

impl fmt::Debug for EnvBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvBinding")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl EnvBinding {
    /// Binds `source` under an optional prefix.
    pub fn new(prefix: Option<&str>, source: impl EnvSource + 'static) -> Self {
        Self {
            prefix: prefix.map(str::to_uppercase),
            source: Box::new(source),
        }
    }

    /// Environment variable name for a parameter key (`host` -> `DENSIFY_HOST`).
    #[must_use]
    pub fn var_name(&self, key: &str) -> String {
        let key = key.to_uppercase();
        match &self.prefix {
            Some(prefix) => format!("{prefix}_{key}"),
            None => key,
        }
    }

    /// Looks up a parameter key. Empty values count as unset.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.source
            .var(&self.var_name(key))
            .filter(|value| !value.is_empty())
    }
}

/// The set of environment bindings, keyed by scope.
#[derive(Debug, Default)]
pub struct EnvSources {
    default: Option<EnvBinding>,
    application: Option<EnvBinding>,
}

impl EnvSources {
    /// Creates a set with no bound scopes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Binds both scopes to the process environment: unprefixed for the
    /// default scope and `DENSIFY_` for the application scope.
    #[must_use]
    pub fn process() -> Self {
        Self::empty()
            .bind(Scope::Default, EnvBinding::new(None, ProcessEnv))
            .bind(
                Scope::Application,
                EnvBinding::new(Some(defaults::APPLICATION_ENV_PREFIX), ProcessEnv),
            )
    }

    /// Binds both scopes to in-memory maps, keyed by full variable name.
    #[must_use]
    pub fn from_maps(default: HashMap<String, String>, application: HashMap<String, String>) -> Self {
        Self::empty()
            .bind(Scope::Default, EnvBinding::new(None, default))
            .bind(
                Scope::Application,
                EnvBinding::new(Some(defaults::APPLICATION_ENV_PREFIX), application),
            )
    }

    /// Binds a scope, replacing any previous binding.
    #[must_use]
    pub fn bind(mut self, scope: Scope, binding: EnvBinding) -> Self {
        match scope {
            Scope::Default => self.default = Some(binding),
            Scope::Application => self.application = Some(binding),
        }
        self
    }

    /// Returns the binding of a scope, if any.
    #[must_use]
    pub const fn get(&self, scope: Scope) -> Option<&EnvBinding> {
        match scope {
            Scope::Default => self.default.as_ref(),
            Scope::Application => self.application.as_ref(),
        }
    }
}
