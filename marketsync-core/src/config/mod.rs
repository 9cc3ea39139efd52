//! Configuration management for marketsync
//!
//! Defaults describe a local development marketplace (keeper node, metadata
//! store, access gateway and secret store on localhost). Values can be
//! overridden from a TOML file or from `MARKETSYNC_<SECTION>_<KEY>`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Marketplace provider endpoints
    pub provider: ProviderConfig,

    /// Cloud blob storage and its OAuth redirect
    pub cloud: CloudConfig,

    /// Sync operation behaviour
    pub sync: SyncConfig,

    /// Local persistence
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Scheme/host/port triple for one remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// Base URL, e.g. `http://localhost:8545`
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

impl FromStr for Endpoint {
    type Err = ConfigError;

    /// Parses `scheme://host:port`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| ConfigError::invalid(s, "endpoint missing scheme"))?;
        let (host, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| ConfigError::invalid(s, "endpoint missing port"))?;
        let port = port
            .trim_end_matches('/')
            .parse()
            .map_err(|e| ConfigError::invalid(s, format!("endpoint port: {}", e)))?;
        Ok(Endpoint::new(scheme, host, port))
    }
}

/// Marketplace provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Secret store threshold
    pub secret_store_threshold: u32,

    /// Secret store account address
    pub secret_store_address: String,

    /// Keeper (chain) node
    pub node: Endpoint,

    /// Metadata store used for asset listing
    pub aquarius: Endpoint,

    /// Access gateway used for purchases
    pub brizo: Endpoint,

    /// Parity node used for signing
    pub parity: Endpoint,

    /// Secret store used for asset encryption
    pub secret_store: Endpoint,
}

/// Cloud storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Key of the OAuth credential used for blob listing
    pub provider_key: String,

    /// Route the OAuth provider redirects back to
    pub redirect_path: String,
}

/// Sync layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Upper bound for one sync operation, facade calls included
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,

    /// Amount requested by the faucet when the caller gives none
    pub faucet_amount: u64,
}

/// Local persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding persisted slots
    pub data_dir: PathBuf,

    /// Slot key holding OAuth credentials
    pub oauth_slot_key: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include target module
    pub with_target: bool,

    /// Emit debug output for sync operations regardless of level
    pub verbose_sync: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            secret_store_threshold: 0,
            secret_store_address: "0x00bd138abd70e2f00903268f3db08f2d25677c9e".to_string(),
            node: Endpoint::new("http", "localhost", 8545),
            aquarius: Endpoint::new("http", "aquarius.dev-ocean.com", 5000),
            brizo: Endpoint::new("http", "localhost", 8030),
            parity: Endpoint::new("http", "localhost", 8545),
            secret_store: Endpoint::new("http", "localhost", 12001),
        }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            provider_key: "azure".to_string(),
            redirect_path: "/oauth/azure".to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(30),
            faucet_amount: 10,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            oauth_slot_key: "oauthAccounts".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: true,
            verbose_sync: true,
        }
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::invalid(key, e)),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: MARKETSYNC_<SECTION>_<KEY>
    /// Example: MARKETSYNC_PROVIDER_NODE=http://localhost:8545
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Provider config
        if let Some(node) = parse_env("MARKETSYNC_PROVIDER_NODE")? {
            self.provider.node = node;
        }
        if let Some(aquarius) = parse_env("MARKETSYNC_PROVIDER_AQUARIUS")? {
            self.provider.aquarius = aquarius;
        }
        if let Some(brizo) = parse_env("MARKETSYNC_PROVIDER_BRIZO")? {
            self.provider.brizo = brizo;
        }

        // Cloud config
        if let Ok(path) = env::var("MARKETSYNC_CLOUD_REDIRECT_PATH") {
            self.cloud.redirect_path = path;
        }

        // Sync config
        if let Ok(raw) = env::var("MARKETSYNC_SYNC_OPERATION_TIMEOUT") {
            self.sync.operation_timeout = humantime_serde::re::humantime::parse_duration(&raw)
                .map_err(|e| ConfigError::invalid("MARKETSYNC_SYNC_OPERATION_TIMEOUT", e))?;
        }
        if let Some(amount) = parse_env("MARKETSYNC_SYNC_FAUCET_AMOUNT")? {
            self.sync.faucet_amount = amount;
        }

        // Store config
        if let Ok(data_dir) = env::var("MARKETSYNC_STORE_DATA_DIR") {
            self.store.data_dir = PathBuf::from(data_dir);
        }

        // Logging config
        if let Ok(level) = env::var("MARKETSYNC_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = parse_env("MARKETSYNC_LOG_JSON")? {
            self.logging.json_format = json;
        }
        if let Some(verbose) = parse_env("MARKETSYNC_LOG_VERBOSE_SYNC")? {
            self.logging.verbose_sync = verbose;
        }

        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.operation_timeout.is_zero() {
            return Err(ConfigError::validation(
                "sync",
                "operation_timeout must be greater than 0",
            ));
        }

        if self.sync.faucet_amount == 0 {
            return Err(ConfigError::validation(
                "sync",
                "faucet_amount must be greater than 0",
            ));
        }

        if self.cloud.provider_key.is_empty() {
            return Err(ConfigError::validation(
                "cloud",
                "provider_key must not be empty",
            ));
        }

        if !self.cloud.redirect_path.starts_with('/') {
            return Err(ConfigError::validation(
                "cloud",
                format!("redirect_path must be absolute: {}", self.cloud.redirect_path),
            ));
        }

        if self.store.oauth_slot_key.is_empty() {
            return Err(ConfigError::validation(
                "store",
                "oauth_slot_key must not be empty",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::validation(
                "logging",
                format!("unknown level: {}", self.logging.level),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;

        std::fs::write(path, contents).map_err(|source| ConfigError::FileWriteError {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}
