//! Test fixtures for creating common test objects
//!
//! Provides a fixture builder for the in-memory marketplace and factory
//! functions wiring a [`SyncLayer`] to in-memory facades.

use crate::config::Config;
use crate::core_sync::adapters::{MarketplaceFixture, MockCloudStorage, MockMarketplace};
use crate::core_sync::{
    Account, Asset, ManualClock, MemorySlotStore, Order, SyncLayer, SyncResult, Timestamp,
};
use std::sync::Arc;
use std::time::Duration;

/// Wall clock reading every test market starts at
pub const TEST_NOW: u64 = 1_700_000_000_000;

/// Builder for marketplace fixtures
#[derive(Debug, Default)]
pub struct FixtureBuilder {
    fixture: MarketplaceFixture,
}

impl FixtureBuilder {
    pub fn new(network_name: impl Into<String>) -> Self {
        Self {
            fixture: MarketplaceFixture {
                network_name: network_name.into(),
                ..Default::default()
            },
        }
    }

    /// Add an account; display index follows insertion order
    pub fn with_account(mut self, name: &str) -> Self {
        let index = self.fixture.accounts.len();
        self.fixture.accounts.push(Account::new(name, index));
        self
    }

    pub fn with_asset(mut self, asset_id: &str, name: &str) -> Self {
        self.fixture.assets.push(Asset::new(asset_id, name));
        self
    }

    pub fn with_order(mut self, consumer: &str, order_id: &str, resource_id: &str) -> Self {
        self.fixture
            .orders
            .entry(consumer.to_string())
            .or_default()
            .push(Order::new(order_id, resource_id));
        self
    }

    pub fn with_container(mut self, container: &str, blobs: &[&str]) -> Self {
        self.fixture
            .containers
            .insert(container.to_string(), blobs.iter().map(|blob| blob.to_string()).collect());
        self
    }

    pub fn build(self) -> MarketplaceFixture {
        self.fixture
    }
}

/// Two accounts, two assets, orders for the first account (one of them for
/// an unlisted asset) and one container of two blobs
pub fn sample_fixture() -> MarketplaceFixture {
    let mut fixture = FixtureBuilder::new("Spree")
        .with_account("0xaaa")
        .with_account("0xbbb")
        .with_asset("did:op:1", "Rainfall")
        .with_asset("did:op:2", "Traffic")
        .with_order("0xaaa", "o-1", "did:op:1")
        .with_order("0xaaa", "o-2", "did:op:gone")
        .with_container("datasets", &["a.csv", "b.csv"])
        .build();
    fixture.assets[0].metadata.description = "hourly".to_string();
    fixture
}

/// Sync layer wired to in-memory facades, with handles to each of them
pub struct TestMarket {
    pub layer: SyncLayer,
    pub market: MockMarketplace,
    pub cloud: MockCloudStorage,
    pub slots: Arc<MemorySlotStore>,
    pub clock: Arc<ManualClock>,
}

pub fn test_market() -> TestMarket {
    test_market_with(sample_fixture(), Duration::from_secs(5))
}

/// Test market over `fixture` with a given operation timeout
pub fn test_market_with(fixture: MarketplaceFixture, operation_timeout: Duration) -> TestMarket {
    let mut config = Config::default();
    config.sync.operation_timeout = operation_timeout;

    let cloud = MockCloudStorage::new(fixture.containers.clone());
    let market = MockMarketplace::new(fixture);
    let slots = Arc::new(MemorySlotStore::new());
    let clock = Arc::new(ManualClock::new(Timestamp::from_millis(TEST_NOW)));
    let layer = SyncLayer::new(
        Arc::new(config),
        Arc::new(market.clone()),
        Arc::new(cloud.clone()),
        slots.clone(),
    )
    .with_clock(clock.clone());

    TestMarket {
        layer,
        market,
        cloud,
        slots,
        clock,
    }
}

/// Test market with the provider connected and accounts loaded
pub async fn ready_market() -> SyncResult<TestMarket> {
    let test = test_market();
    test.layer.set_providers().await?;
    test.layer.get_accounts().await?;
    Ok(test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_builder() {
        let fixture = FixtureBuilder::new("Nile")
            .with_account("0x1")
            .with_account("0x2")
            .with_order("0x2", "o-1", "a-1")
            .build();

        assert_eq!(fixture.network_name, "Nile");
        assert_eq!(fixture.accounts[1].display_index, 1);
        assert_eq!(fixture.orders["0x2"].len(), 1);
    }

    #[tokio::test]
    async fn test_ready_market() {
        let test = ready_market().await.unwrap();
        let state = test.layer.snapshot();
        assert!(state.is_provider_ready());
        assert_eq!(state.account.accounts.len(), 2);
    }
}
