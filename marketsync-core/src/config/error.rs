//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read marketsync config {}: {source}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write marketsync config {}: {source}", path.display())]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse marketsync config {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize marketsync config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A single value, from the environment or an endpoint string, did not parse
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid [{section}] config: {message}")]
    ValidationFailed {
        section: &'static str,
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, message: impl ToString) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn validation(section: &'static str, message: impl Into<String>) -> Self {
        ConfigError::ValidationFailed {
            section,
            message: message.into(),
        }
    }
}
