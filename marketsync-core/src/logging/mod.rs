//! Logging subsystem for marketsync
//!
//! Installs a `tracing` subscriber with an env-driven filter. Sync operations
//! log with structured fields, so JSON output is available for collectors.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod level;

pub use error::LoggingError;
pub use level::LogLevel;

use crate::config::LoggingConfig;

/// Configuration for the logging subsystem
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// The minimum log level to display
    pub level: LogLevel,
    /// Whether to include target module information
    pub with_target: bool,
    /// Whether to use JSON formatting
    pub json_format: bool,
    /// Extra per-target directives, e.g. `marketsync_core::core_sync=debug`
    pub directives: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            with_target: true,
            json_format: false,
            directives: Vec::new(),
        }
    }
}

impl LogConfig {
    /// Create a new LogConfig with specified level
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Set whether to include target information
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Set whether to use JSON formatting
    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// Add a per-target filter directive
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Build from the `[logging]` config section
    pub fn from_config(config: &LoggingConfig) -> Result<Self, LoggingError> {
        let level: LogLevel = config.level.parse()?;
        let mut log_config = LogConfig::new(level)
            .with_target(config.with_target)
            .json_format(config.json_format);
        if config.verbose_sync {
            log_config = log_config.directive("marketsync_core::core_sync=debug");
        }
        Ok(log_config)
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        let mut filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new(self.level.as_str()),
        };
        for directive in &self.directives {
            let parsed = directive
                .parse()
                .map_err(|e| LoggingError::InvalidConfiguration(format!("{}: {}", directive, e)))?;
            filter = filter.add_directive(parsed);
        }
        Ok(filter)
    }
}

/// Initialize the logging subsystem with default configuration
///
/// # Example
/// ```
/// use marketsync_core::logging::init_logging;
///
/// init_logging().expect("Failed to initialize logging");
/// ```
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(LogConfig::default())
}

/// Initialize the logging subsystem with custom configuration
///
/// `RUST_LOG` takes precedence over the configured level; extra directives
/// are layered on top of either.
pub fn init_logging_with_config(config: LogConfig) -> Result<(), LoggingError> {
    let env_filter = config.env_filter()?;
    let fmt_layer = fmt::layer().with_target(config.with_target);

    let result = if config.json_format {
        tracing_subscriber::registry().with(env_filter).with(fmt_layer.json()).try_init()
    } else {
        tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()
    };

    result.map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}
