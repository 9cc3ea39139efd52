//! In-memory marketplace
//!
//! Implements the marketplace, catalog and connector facades over a shared
//! in-memory state so the sync layer can be exercised without a node. Calls
//! can be delayed or made to fail, and every call is recorded.

use crate::config::ProviderConfig;
use crate::core_sync::{
    errors::{FacadeError, FacadeResult},
    facade::{AssetCatalog, MarketProvider, ProviderConnector, ProviderContext},
    types::{Account, AccountId, Asset, AssetForm, AssetId, Balance, Order, TokenArtifact},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Facade calls, for failure injection and call logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    Connect,
    GetAccounts,
    NetworkName,
    RequestTokens,
    OrdersByConsumer,
    ListAssets,
    Publish,
    Purchase,
}

/// Initial marketplace contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceFixture {
    pub network_name: String,
    pub accounts: Vec<Account>,
    pub assets: Vec<Asset>,
    /// Orders keyed by consumer address
    pub orders: BTreeMap<String, Vec<Order>>,
    /// Blob names keyed by container, served by the cloud mock
    pub containers: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Default)]
struct MockState {
    fixture: MarketplaceFixture,
    failures: HashMap<MockCall, String>,
    delay: Option<Duration>,
    calls: Vec<MockCall>,
    next_id: u64,
}

/// In-memory marketplace; clones share state
#[derive(Debug, Clone, Default)]
pub struct MockMarketplace {
    state: Arc<Mutex<MockState>>,
}

impl MockMarketplace {
    pub fn new(fixture: MarketplaceFixture) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                fixture,
                ..Default::default()
            })),
        }
    }

    /// Make every subsequent `call` fail with `message`
    pub fn fail(&self, call: MockCall, message: impl Into<String>) {
        let message = message.into();
        let _ = self.with_state(|state| state.failures.insert(call, message));
    }

    pub fn clear_failure(&self, call: MockCall) {
        let _ = self.with_state(|state| state.failures.remove(&call));
    }

    /// Delay every facade call by `delay`
    pub fn set_delay(&self, delay: Option<Duration>) {
        let _ = self.with_state(|state| state.delay = delay);
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.with_state(|state| state.calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, call: MockCall) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    /// Current marketplace contents
    pub fn fixture(&self) -> MarketplaceFixture {
        self.with_state(|state| state.fixture.clone()).unwrap_or_default()
    }

    pub fn set_accounts(&self, accounts: Vec<Account>) {
        let _ = self.with_state(|state| state.fixture.accounts = accounts);
    }

    pub fn set_assets(&self, assets: Vec<Asset>) {
        let _ = self.with_state(|state| state.fixture.assets = assets);
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> FacadeResult<R> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| FacadeError::new("mock marketplace state poisoned"))?;
        Ok(f(&mut state))
    }

    /// Record `call`, apply the configured delay and injected failure
    async fn enter(&self, call: MockCall) -> FacadeResult<()> {
        let (delay, failure) = self.with_state(|state| {
            state.calls.push(call);
            (state.delay, state.failures.get(&call).cloned())
        })?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(message) => Err(FacadeError::new(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MarketProvider for MockMarketplace {
    async fn get_accounts(&self) -> FacadeResult<Vec<Account>> {
        self.enter(MockCall::GetAccounts).await?;
        self.with_state(|state| state.fixture.accounts.clone())
    }

    async fn network_name(&self) -> FacadeResult<String> {
        self.enter(MockCall::NetworkName).await?;
        self.with_state(|state| state.fixture.network_name.clone())
    }

    async fn request_tokens(&self, amount: u64, account: &AccountId) -> FacadeResult<()> {
        self.enter(MockCall::RequestTokens).await?;
        self.with_state(|state| {
            let target = state
                .fixture
                .accounts
                .iter_mut()
                .find(|candidate| &candidate.name == account)
                .ok_or_else(|| FacadeError::new(format!("unknown account {}", account)))?;
            let balance = target.balance.get_or_insert_with(Balance::default);
            balance.ocn = balance.ocn.saturating_add(amount);
            Ok(())
        })?
    }

    async fn orders_by_consumer(&self, consumer: &AccountId) -> FacadeResult<Vec<Order>> {
        self.enter(MockCall::OrdersByConsumer).await?;
        self.with_state(|state| {
            state
                .fixture
                .orders
                .get(consumer.as_str())
                .cloned()
                .unwrap_or_default()
        })
    }
}

#[async_trait]
impl AssetCatalog for MockMarketplace {
    async fn list(
        &self,
        _account: &Account,
        _provider: &ProviderContext,
    ) -> FacadeResult<Vec<Asset>> {
        self.enter(MockCall::ListAssets).await?;
        self.with_state(|state| state.fixture.assets.clone())
    }

    async fn publish(
        &self,
        form: &AssetForm,
        account: &Account,
        _provider: &ProviderContext,
    ) -> FacadeResult<()> {
        self.enter(MockCall::Publish).await?;
        if form.name.trim().is_empty() {
            return Err(FacadeError::new("asset name is required"));
        }
        self.with_state(|state| {
            state.next_id += 1;
            let mut asset = Asset::new(format!("did:op:{:04}", state.next_id), form.name.clone())
                .with_description(form.description.clone());
            let extra = &mut asset.metadata.extra;
            extra.insert(
                "author".to_string(),
                Value::String(account.name.to_string()),
            );
            extra.insert("price".to_string(), Value::from(form.price));
            extra.insert(
                "contentUrls".to_string(),
                Value::Array(form.content_urls.iter().cloned().map(Value::String).collect()),
            );
            state.fixture.assets.push(asset);
        })
    }

    async fn purchase(
        &self,
        asset: &Asset,
        account: &Account,
        _provider: &ProviderContext,
    ) -> FacadeResult<TokenArtifact> {
        self.enter(MockCall::Purchase).await?;
        self.with_state(|state| {
            if !state.fixture.assets.iter().any(|listed| listed.asset_id == asset.asset_id) {
                return Err(FacadeError::new(format!("asset {} is not listed", asset.asset_id)));
            }
            state.next_id += 1;
            let order = Order::new(format!("order-{:04}", state.next_id), asset.asset_id.as_str());
            state.fixture.orders.entry(account.name.to_string()).or_default().push(order);
            Ok(TokenArtifact(format!("access-{}-{}", asset.asset_id, state.next_id)))
        })?
    }
}

#[async_trait]
impl ProviderConnector for MockMarketplace {
    async fn connect(&self, config: &ProviderConfig) -> FacadeResult<ProviderContext> {
        self.enter(MockCall::Connect).await?;
        let shared = Arc::new(self.clone());
        Ok(ProviderContext::new(shared.clone(), shared, config.node.url()))
    }
}

/// Look up a listed asset by id
pub fn find_asset<'a>(fixture: &'a MarketplaceFixture, asset_id: &AssetId) -> Option<&'a Asset> {
    fixture.assets.iter().find(|asset| &asset.asset_id == asset_id)
}
