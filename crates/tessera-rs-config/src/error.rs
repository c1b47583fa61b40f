//! Error types for config loading, mutation and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the config store and its helpers.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Writing a config file failed.
    #[error("failed to write config to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Parsing a config document failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Encoding the merged config failed.
    #[error("failed to encode config: {0}")]
    EncodeFailed(#[from] serde_json::Error),
    /// A config document did not contain an object at its root.
    #[error("config document must be an object: {path}")]
    NotAnObject { path: PathBuf },
    /// A dot-separated config path was malformed.
    #[error("invalid config path: {0:?}")]
    InvalidPath(String),
    /// Validation was requested for a section that has no checks.
    #[error("unknown validation section: {0}")]
    UnknownSection(String),
    /// A floating point value was NaN or infinite.
    #[error("cannot store non-finite value at {0}")]
    NonFiniteValue(String),
}
