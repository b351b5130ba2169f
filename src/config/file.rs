//! Config file location and style selection.
//!
//! The file is either *flat* (properties, keys identical to parameter keys)
//! or *structured* (YAML mirroring [`ValidatedConfig`]). The declared type
//! wins over the file extension.
//!
//! [`ValidatedConfig`]: super::ValidatedConfig

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::ConfigError;

/// How a config file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStyle {
    /// Properties file; feeds precedence resolution directly.
    Flat,
    /// YAML document; parsed separately and merged afterwards.
    Structured,
    /// Neither type nor extension is recognized; no file is read.
    Unknown,
}

impl FileStyle {
    /// Maps a type name or extension to a style.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "yaml" | "yml" => Self::Structured,
            "properties" | "props" => Self::Flat,
            _ => Self::Unknown,
        }
    }
}

/// Directory, file name, and declared type of the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    dir: String,
    file: String,
    declared_type: String,
}

impl FileLocation {
    /// Creates a location. The declared type is lower-cased.
    pub fn new(dir: impl Into<String>, file: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file: file.into(),
            declared_type: declared_type.into().to_lowercase(),
        }
    }

    /// Classifies the file: declared type first, then file extension.
    #[must_use]
    pub fn style(&self) -> FileStyle {
        match FileStyle::from_name(&self.declared_type) {
            FileStyle::Unknown => Path::new(&self.file)
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(FileStyle::Unknown, FileStyle::from_name),
            style => style,
        }
    }

    /// Full path of the file.
    ///
    /// The declared type is appended as extension when the file name has none.
    /// A leading `~` in the directory expands to the home directory.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        let file = if Path::new(&self.file).extension().is_none() && !self.declared_type.is_empty() {
            format!("{}.{}", self.file, self.declared_type)
        } else {
            self.file.clone()
        };
        expand_home(&self.dir).join(file)
    }
}

fn expand_home(dir: &str) -> PathBuf {
    if let Some(rest) = dir.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest.trim_start_matches('/'));
            }
        }
    }
    PathBuf::from(dir)
}

/// Reads a properties file into a key/value map.
///
/// A missing file is not an error: the flat file is optional.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_properties(path: &Path) -> Result<Option<HashMap<String, String>>, ConfigError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No properties file found");
            return Ok(None);
        }
        Err(e) => {
            return Err(ConfigError::FileRead {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let entries =
        java_properties::read(BufReader::new(file)).map_err(|e| ConfigError::PropertiesParse {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!(path = %path.display(), entries = entries.len(), "Loaded properties file");
    Ok(Some(entries))
}
