//! Remote facades consumed by the sync layer
//!
//! The marketplace SDK, the asset catalog and cloud blob storage are external
//! collaborators. The sync layer only sees these traits, so it can run
//! against a live SDK binding or against the in-memory adapters used by the
//! tests and the CLI.
//!
//! ```text
//! SyncLayer
//!     |
//!     +---> ProviderConnector --connect--> ProviderContext { market, catalog }
//!     |
//!     +---> CloudStorage
//! ```

use super::errors::FacadeResult;
use super::types::{
    Account, AccountId, Asset, AssetForm, BlobEntry, Container, Order, TokenArtifact,
};
use crate::config::ProviderConfig;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Chain/marketplace operations of the SDK
#[async_trait]
pub trait MarketProvider: Send + Sync {
    /// Accounts unlocked on the node, in display order
    async fn get_accounts(&self) -> FacadeResult<Vec<Account>>;

    /// Name of the network the node is connected to
    async fn network_name(&self) -> FacadeResult<String>;

    /// Ask the faucet to credit `amount` tokens to `account`
    async fn request_tokens(&self, amount: u64, account: &AccountId) -> FacadeResult<()>;

    /// All orders placed by `consumer`
    async fn orders_by_consumer(&self, consumer: &AccountId) -> FacadeResult<Vec<Order>>;
}

/// Asset listing, publishing and purchasing
#[async_trait]
pub trait AssetCatalog: Send + Sync {
    /// Assets visible to `account`
    async fn list(&self, account: &Account, provider: &ProviderContext)
        -> FacadeResult<Vec<Asset>>;

    /// Register a new asset owned by `account`
    async fn publish(
        &self,
        form: &AssetForm,
        account: &Account,
        provider: &ProviderContext,
    ) -> FacadeResult<()>;

    /// Buy access to `asset`, returning the access token
    async fn purchase(
        &self,
        asset: &Asset,
        account: &Account,
        provider: &ProviderContext,
    ) -> FacadeResult<TokenArtifact>;
}

/// Produces a live [`ProviderContext`]
#[async_trait]
pub trait ProviderConnector: Send + Sync {
    async fn connect(&self, config: &ProviderConfig) -> FacadeResult<ProviderContext>;
}

/// Cloud blob storage authorized with an OAuth bearer token
#[async_trait]
pub trait CloudStorage: Send + Sync {
    async fn list_containers(&self, access_token: &str) -> FacadeResult<Vec<Container>>;

    async fn list_blobs(&self, access_token: &str, container: &str) -> FacadeResult<Vec<BlobEntry>>;
}

/// Live provider handles held in state once bootstrap completed
#[derive(Clone)]
pub struct ProviderContext {
    pub market: Arc<dyn MarketProvider>,
    pub catalog: Arc<dyn AssetCatalog>,
    /// Node the context was connected to, for diagnostics
    pub node_url: String,
}

impl ProviderContext {
    pub fn new(
        market: Arc<dyn MarketProvider>,
        catalog: Arc<dyn AssetCatalog>,
        node_url: impl Into<String>,
    ) -> Self {
        Self {
            market,
            catalog,
            node_url: node_url.into(),
        }
    }
}

impl fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderContext").field("node_url", &self.node_url).finish_non_exhaustive()
    }
}
