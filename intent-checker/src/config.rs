//! Checker configuration and settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options for one checker run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Attached to every diagnostic's `file` field
    pub file: Option<String>,
    /// Append nearest-name hints to unknown-name diagnostics
    pub suggestions: bool,
    pub max_suggestion_distance: usize,
    /// Treat warnings as blocking emission. Never changes a diagnostic's level.
    pub strict: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            file: None,
            suggestions: true,
            max_suggestion_distance: 2,
            strict: false,
        }
    }
}

impl CheckOptions {
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse options from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|error| ConfigError::Parse { path: None, error })
    }

    /// Load options from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;

        toml::from_str(&content).map_err(|error| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            error,
        })
    }

    /// The suggestion distance bound, or `None` when hints are disabled
    pub(crate) fn suggestion_bound(&self) -> Option<usize> {
        self.suggestions.then_some(self.max_suggestion_distance)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error for {path:?}: {error}")]
    Io { path: PathBuf, error: std::io::Error },

    #[error("Parse error for {path:?}: {error}")]
    Parse {
        path: Option<PathBuf>,
        error: toml::de::Error,
    },
}
