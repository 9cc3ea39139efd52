//! Transition descriptors
//!
//! A transition is an immutable record of one state change. Sync operations
//! build them; the store applies them one at a time through
//! [`reduce`](super::state::reduce).

use super::facade::ProviderContext;
use super::types::{
    Account, AccountId, Asset, AssetFilter, AssetId, CloudBlob, Location, OAuthAccounts, Order,
    OrderId, TokenArtifact,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Assets keyed by id
pub type AssetMap = BTreeMap<AssetId, Asset>;

/// Orders keyed by id
pub type OrderMap = BTreeMap<OrderId, Order>;

/// One state change
#[derive(Debug, Clone)]
pub enum Transition {
    ProviderReady(ProviderContext),
    AccountsSet(Vec<Account>),
    ActiveAccountSet(Option<AccountId>),
    NetworkNameSet(String),
    AssetsSet(AssetMap),
    ActiveAssetSet(Option<AssetId>),
    /// Field-level merge of `token` into an existing asset
    AssetUpdated {
        asset_id: AssetId,
        token: TokenArtifact,
    },
    AssetFilterSet(AssetFilter),
    OrdersSet(OrderMap),
    ActiveOrderSet(Option<OrderId>),
    OAuthAccountsSet(OAuthAccounts),
    CloudBlobsSet(Vec<CloudBlob>),
    CloudBlobsCleared,
    CloudError(String),
    LocationChanged(Location),
}

/// Discriminant of a [`Transition`], used for logs and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    ProviderReady,
    AccountsSet,
    ActiveAccountSet,
    NetworkNameSet,
    AssetsSet,
    ActiveAssetSet,
    AssetUpdated,
    AssetFilterSet,
    OrdersSet,
    ActiveOrderSet,
    OauthAccountsSet,
    CloudBlobsSet,
    CloudBlobsCleared,
    CloudError,
    LocationChanged,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::ProviderReady => "provider-ready",
            TransitionKind::AccountsSet => "accounts-set",
            TransitionKind::ActiveAccountSet => "active-account-set",
            TransitionKind::NetworkNameSet => "network-name-set",
            TransitionKind::AssetsSet => "assets-set",
            TransitionKind::ActiveAssetSet => "active-asset-set",
            TransitionKind::AssetUpdated => "asset-updated",
            TransitionKind::AssetFilterSet => "asset-filter-set",
            TransitionKind::OrdersSet => "orders-set",
            TransitionKind::ActiveOrderSet => "active-order-set",
            TransitionKind::OauthAccountsSet => "oauth-accounts-set",
            TransitionKind::CloudBlobsSet => "cloud-blobs-set",
            TransitionKind::CloudBlobsCleared => "cloud-blobs-cleared",
            TransitionKind::CloudError => "cloud-error",
            TransitionKind::LocationChanged => "location-changed",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Transition::ProviderReady(_) => TransitionKind::ProviderReady,
            Transition::AccountsSet(_) => TransitionKind::AccountsSet,
            Transition::ActiveAccountSet(_) => TransitionKind::ActiveAccountSet,
            Transition::NetworkNameSet(_) => TransitionKind::NetworkNameSet,
            Transition::AssetsSet(_) => TransitionKind::AssetsSet,
            Transition::ActiveAssetSet(_) => TransitionKind::ActiveAssetSet,
            Transition::AssetUpdated { .. } => TransitionKind::AssetUpdated,
            Transition::AssetFilterSet(_) => TransitionKind::AssetFilterSet,
            Transition::OrdersSet(_) => TransitionKind::OrdersSet,
            Transition::ActiveOrderSet(_) => TransitionKind::ActiveOrderSet,
            Transition::OAuthAccountsSet(_) => TransitionKind::OauthAccountsSet,
            Transition::CloudBlobsSet(_) => TransitionKind::CloudBlobsSet,
            Transition::CloudBlobsCleared => TransitionKind::CloudBlobsCleared,
            Transition::CloudError(_) => TransitionKind::CloudError,
            Transition::LocationChanged(_) => TransitionKind::LocationChanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Transition::CloudBlobsCleared.kind().as_str(), "cloud-blobs-cleared");
        assert_eq!(
            Transition::OAuthAccountsSet(OAuthAccounts::new())
                .kind()
                .to_string(),
            "oauth-accounts-set"
        );
        assert_eq!(
            serde_json::to_string(&TransitionKind::AssetFilterSet).unwrap(),
            "\"asset-filter-set\""
        );
    }
}
