//! Error types for the sync layer

use super::types::AssetId;
use std::time::Duration;
use thiserror::Error;

/// Result type for facade calls
pub type FacadeResult<T> = Result<T, FacadeError>;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Failure reported by a remote facade
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FacadeError {
    pub message: String,
}

impl FacadeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Local slot read/write failure
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Slot I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid slot key: {0}")]
    InvalidKey(String),

    #[error("Slot store lock poisoned")]
    Poisoned,
}

/// Errors that can occur in sync operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Bootstrap has not produced a provider context yet
    #[error("Provider not ready: call set_providers first")]
    ProviderNotReady,

    /// No account is selected, or the selection is stale
    #[error("No active account")]
    NoActiveAccount,

    /// Faucet amount must be positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(u64),

    /// No OAuth credential stored for the cloud provider
    #[error("No stored credential for cloud provider {0}")]
    NoCloudCredential(String),

    /// Asset is not in the current mapping
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    /// Remote call failed
    #[error("{operation} failed: {source}")]
    Remote {
        operation: &'static str,
        #[source]
        source: FacadeError,
    },

    /// Cloud container listing failed
    #[error("Error listing containers: {0}")]
    ContainerListing(#[source] FacadeError),

    /// Cloud blob listing failed for one container
    #[error("Error listing blobs in {container}: {source}")]
    BlobListing {
        container: String,
        #[source]
        source: FacadeError,
    },

    /// Operation exceeded its deadline
    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },

    /// Operation was cancelled by shutdown
    #[error("{0} cancelled by shutdown")]
    Cancelled(&'static str),

    /// Local slot failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Serialization(e.to_string())
    }
}

impl SyncError {
    /// Wrap a facade failure with the name of the call that produced it
    pub fn remote(operation: &'static str) -> impl FnOnce(FacadeError) -> SyncError {
        move |source| SyncError::Remote { operation, source }
    }

    /// True for "precondition not met" conditions
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SyncError::ProviderNotReady
                | SyncError::NoActiveAccount
                | SyncError::InvalidAmount(_)
                | SyncError::NoCloudCredential(_)
        )
    }

    /// Message shown to the user when the failure is reported as state
    pub fn report_message(&self) -> String {
        match self {
            SyncError::ContainerListing(source) => format!("Error listing containers: {}", source),
            SyncError::BlobListing { source, .. } => format!("Error: {}", source),
            SyncError::Remote { source, .. } => format!("Error: {}", source),
            other => format!("Error: {}", other),
        }
    }
}
