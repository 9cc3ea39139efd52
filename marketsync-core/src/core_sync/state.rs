//! Client-side state and the reducer that advances it
//!
//! `reduce` is pure: it never mutates its input and never performs I/O.
//! Each applied transition bumps `revision` exactly once.

use super::facade::ProviderContext;
use super::transition::{AssetMap, OrderMap, Transition};
use super::types::{
    Account, AccountId, AssetFilter, AssetId, CloudBlob, Location, OAuthAccounts, OrderId,
};
use serde::Serialize;

/// Snapshot of everything the sync layer maintains
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    /// Number of transitions applied so far
    pub revision: u64,
    /// Set by bootstrap; never serialized
    #[serde(skip)]
    pub provider: Option<ProviderContext>,
    pub account: AccountState,
    pub asset: AssetState,
    pub order: OrderState,
    pub oauth_accounts: OAuthAccounts,
    pub cloud_storage: CloudStorageState,
    pub router: RouterState,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountState {
    pub accounts: Vec<Account>,
    /// Explicit selection; `None` falls back to the first account
    pub active_account: Option<AccountId>,
    pub network_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetState {
    pub assets: AssetMap,
    pub active_asset: Option<AssetId>,
    pub filter: AssetFilter,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderState {
    pub orders: OrderMap,
    pub active_order: Option<OrderId>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CloudStorageState {
    pub blobs: Vec<CloudBlob>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RouterState {
    pub location: Location,
}

impl AppState {
    pub fn is_provider_ready(&self) -> bool {
        self.provider.is_some()
    }
}

/// Apply one transition, producing the next state
pub fn reduce(state: &AppState, transition: Transition) -> AppState {
    let mut next = state.clone();
    next.revision = state.revision + 1;

    match transition {
        Transition::ProviderReady(provider) => next.provider = Some(provider),
        Transition::AccountsSet(accounts) => next.account.accounts = accounts,
        Transition::ActiveAccountSet(account) => next.account.active_account = account,
        Transition::NetworkNameSet(name) => next.account.network_name = Some(name),
        Transition::AssetsSet(assets) => next.asset.assets = assets,
        Transition::ActiveAssetSet(asset_id) => next.asset.active_asset = asset_id,
        Transition::AssetUpdated { asset_id, token } => {
            // The record may have been replaced by a concurrent list; nothing to merge into then.
            if let Some(asset) = next.asset.assets.get_mut(&asset_id) {
                asset.token = Some(token);
            }
        }
        Transition::AssetFilterSet(filter) => next.asset.filter = filter,
        Transition::OrdersSet(orders) => next.order.orders = orders,
        Transition::ActiveOrderSet(order_id) => next.order.active_order = order_id,
        Transition::OAuthAccountsSet(accounts) => next.oauth_accounts = accounts,
        Transition::CloudBlobsSet(blobs) => {
            next.cloud_storage.blobs = blobs;
            next.cloud_storage.error = None;
        }
        Transition::CloudBlobsCleared => next.cloud_storage = CloudStorageState::default(),
        Transition::CloudError(message) => next.cloud_storage.error = Some(message),
        Transition::LocationChanged(location) => next.router.location = location,
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_sync::types::{Account, Asset, CloudBlob, TokenArtifact};

    fn blob(container: &str, name: &str) -> CloudBlob {
        CloudBlob {
            container: container.to_string(),
            blob_name: name.to_string(),
        }
    }

    #[test]
    fn test_revision_increments_once_per_transition() {
        let state = AppState::default();
        let state = reduce(&state, Transition::NetworkNameSet("nile".into()));
        let state = reduce(&state, Transition::CloudBlobsCleared);
        assert_eq!(state.revision, 2);
        assert_eq!(state.account.network_name.as_deref(), Some("nile"));
    }

    #[test]
    fn test_reduce_does_not_touch_input() {
        let state = AppState::default();
        let next = reduce(&state, Transition::AccountsSet(vec![Account::new("0xabc", 0)]));
        assert!(state.account.accounts.is_empty());
        assert_eq!(next.account.accounts.len(), 1);
    }

    #[test]
    fn test_asset_updated_merges_only_token() {
        let mut assets = AssetMap::new();
        let asset = Asset::new("a-1", "Rainfall").with_description("hourly");
        assets.insert(asset.asset_id.clone(), asset.clone());
        let state = reduce(&AppState::default(), Transition::AssetsSet(assets));

        let next = reduce(
            &state,
            Transition::AssetUpdated {
                asset_id: AssetId::new("a-1"),
                token: TokenArtifact("tok".into()),
            },
        );

        let updated = &next.asset.assets[&AssetId::new("a-1")];
        assert_eq!(updated.token, Some(TokenArtifact("tok".into())));
        assert_eq!(updated.metadata, asset.metadata);
        assert_eq!(updated.asset_id, asset.asset_id);
    }

    #[test]
    fn test_asset_updated_for_missing_asset_is_ignored() {
        let next = reduce(
            &AppState::default(),
            Transition::AssetUpdated {
                asset_id: AssetId::new("gone"),
                token: TokenArtifact("tok".into()),
            },
        );
        assert!(next.asset.assets.is_empty());
        assert_eq!(next.revision, 1);
    }

    #[test]
    fn test_cloud_error_then_clear() {
        let state = reduce(
            &AppState::default(),
            Transition::CloudBlobsSet(vec![blob("a", "x.csv")]),
        );
        let state = reduce(&state, Transition::CloudError("Error: boom".into()));
        assert_eq!(state.cloud_storage.error.as_deref(), Some("Error: boom"));

        let state = reduce(&state, Transition::CloudBlobsCleared);
        assert!(state.cloud_storage.blobs.is_empty());
        assert!(state.cloud_storage.error.is_none());
    }

    #[test]
    fn test_blobs_set_clears_previous_error() {
        let state = reduce(&AppState::default(), Transition::CloudError("Error: boom".into()));
        let state = reduce(&state, Transition::CloudBlobsSet(vec![blob("a", "x.csv")]));
        assert!(state.cloud_storage.error.is_none());
        assert_eq!(state.cloud_storage.blobs, vec![blob("a", "x.csv")]);
    }

    #[test]
    fn test_snapshot_serializes_without_provider() {
        let state = reduce(&AppState::default(), Transition::NetworkNameSet("spree".into()));
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("provider").is_none());
        assert_eq!(json["account"]["network_name"], "spree");
        assert_eq!(json["revision"], 1);
    }
}
