//! Provider bootstrap

use super::SyncLayer;
use crate::core_sync::{
    errors::{SyncError, SyncResult},
    policy::Operation,
    transition::Transition,
    types::Location,
};
use tracing::info;

impl SyncLayer {
    /// Connect to the marketplace and publish the provider context and
    /// network name
    pub async fn set_providers(&self) -> SyncResult<()> {
        let node = self.config.provider.node.url();
        self.execute(Operation::SetProviders, Some(&node), async {
            let provider = self
                .connector
                .connect(&self.config.provider)
                .await
                .map_err(SyncError::remote("connect"))?;
            let market = provider.market.clone();
            self.store.dispatch(Transition::ProviderReady(provider)).await;

            let network = market.network_name().await.map_err(SyncError::remote("network_name"))?;
            info!(network = %network, "Provider ready");
            self.store.dispatch(Transition::NetworkNameSet(network)).await;
            Ok(())
        })
        .await
    }

    /// Record a route change of the embedding view
    pub async fn navigate(&self, location: Location) {
        self.store.dispatch(Transition::LocationChanged(location)).await;
    }
}
