//! Order synchronization

use super::{require_account, require_provider, SyncLayer};
use crate::core_sync::{
    errors::{SyncError, SyncResult},
    policy::Operation,
    transition::{AssetMap, OrderMap, Transition},
    types::{Order, OrderId},
};
use tracing::debug;

/// Key orders by id, copying the asset name for resources in `assets`
pub fn denormalize_orders(orders: Vec<Order>, assets: &AssetMap) -> OrderMap {
    orders
        .into_iter()
        .map(|mut order| {
            if let Some(asset) = assets.get(&order.resource_id) {
                order.asset_name = Some(asset.metadata.name.clone());
            }
            (order.id.clone(), order)
        })
        .collect()
}

impl SyncLayer {
    /// Replace the order mapping with the active account's orders
    pub async fn get_orders(&self) -> SyncResult<()> {
        self.execute(Operation::GetOrders, None, async {
            let state = self.store.snapshot();
            let account = require_account(&state)?;
            let provider = require_provider(&state)?;

            let orders = provider
                .market
                .orders_by_consumer(&account.name)
                .await
                .map_err(SyncError::remote("orders_by_consumer"))?;
            debug!(consumer = %account.name, count = orders.len(), "Fetched orders");

            let orders = denormalize_orders(orders, &state.asset.assets);
            self.store.dispatch(Transition::OrdersSet(orders)).await;
            Ok(())
        })
        .await
    }

    pub async fn set_active_order(&self, order_id: Option<OrderId>) {
        self.store.dispatch(Transition::ActiveOrderSet(order_id)).await;
    }
}
