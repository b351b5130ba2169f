//! Values that may be given directly or as a path to a file holding them.
//!
//! Kubernetes secrets reach a pod either as environment variables or as
//! mounted files; parameters marked "value or filename" accept both.

use std::path::{Path, PathBuf};

use super::ConfigError;

/// A resolved value-or-path parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueOrPath {
    value: String,
    path: Option<PathBuf>,
}

impl ValueOrPath {
    /// Resolves `s`.
    ///
    /// - `file_only`: `s` must name a file (mounted secret, certificate).
    /// - `should_read`: read the file's contents into [`value`](Self::value);
    ///   otherwise only check that it exists and keep its [`path`](Self::path).
    ///
    /// If the file cannot be accessed, `s` itself is the value unless
    /// `file_only` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SecretRead`] if `file_only` is set and the file
    /// cannot be accessed.
    pub fn resolve(s: &str, file_only: bool, should_read: bool) -> Result<Self, ConfigError> {
        if s.is_empty() {
            return Ok(Self::default());
        }

        let path = Path::new(s);
        let outcome = if should_read {
            std::fs::read_to_string(path).map(|contents| Self {
                value: contents.trim_end_matches(['\r', '\n']).to_string(),
                path: None,
            })
        } else {
            std::fs::metadata(path).map(|_| Self {
                value: String::new(),
                path: Some(path.to_path_buf()),
            })
        };

        match outcome {
            Ok(resolved) => Ok(resolved),
            Err(source) if file_only => Err(ConfigError::SecretRead {
                path: path.to_path_buf(),
                source,
            }),
            Err(_) => Ok(Self {
                value: s.to_string(),
                path: None,
            }),
        }
    }

    /// The value, read from file or given directly.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The file path, when resolved without reading.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns true if there is neither a value nor a path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && !self.is_file()
    }

    /// Returns true if this resolved to a file path.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        self.path.is_some()
    }
}
