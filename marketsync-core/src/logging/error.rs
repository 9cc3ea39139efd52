//! Error types for the logging subsystem

use thiserror::Error;

/// Errors raised while installing the global subscriber
#[derive(Debug, Clone, Error)]
pub enum LoggingError {
    /// A global subscriber was already installed, or the layer stack failed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// A level or filter directive could not be parsed
    #[error("Invalid logging configuration: {0}")]
    InvalidConfiguration(String),
}
