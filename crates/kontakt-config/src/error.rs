//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The named file does not exist.
    #[error("config file {path} does not exist")]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read config file {path}")]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML, or has unknown fields.
    #[error("malformed TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file is not valid JSON, or has unknown fields.
    #[error("malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Only TOML and JSON are understood.
    #[error("unsupported config format '{0}', expected toml or json")]
    UnsupportedFormat(String),

    /// A loaded value is out of range or unparsable.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted field name, e.g. `server.http_addr`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `KONTAKT__*` override could not be applied.
    #[error("bad override {var}: {reason}")]
    InvalidOverride {
        /// Variable name.
        var: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_override(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOverride {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
