//! Pure read-side selectors over [`AppState`]
//!
//! Selectors never fail: a missing or stale reference reads as `None`.

use super::state::AppState;
use super::types::{Account, Asset, AssetId, OAuthCredential, Order};

/// The selected account, resolved against the current list
///
/// Without an explicit selection the first account is active. A selection
/// that is no longer in the list means no account is active.
pub fn active_account(state: &AppState) -> Option<&Account> {
    let accounts = &state.account.accounts;
    match &state.account.active_account {
        Some(id) => accounts.iter().find(|account| &account.name == id),
        None => accounts.first(),
    }
}

pub fn network_name(state: &AppState) -> Option<&str> {
    state.account.network_name.as_deref()
}

/// Trailing segment of a route path, read as an asset id
///
/// `/asset/did:op:42` yields `did:op:42`; paths without a separator or with
/// an empty trailing segment yield `None`.
pub fn asset_id_from_path(path: &str) -> Option<AssetId> {
    let is_separator = |c: char| c == '/' || c == '\\';
    if !path.contains(is_separator) {
        return None;
    }
    let segment = path.rsplit(is_separator).next()?.trim();
    if segment.is_empty() {
        None
    } else {
        Some(AssetId::new(segment))
    }
}

/// The explicitly selected asset, or the one named by the current route
pub fn active_asset(state: &AppState) -> Option<&Asset> {
    let assets = &state.asset.assets;
    match &state.asset.active_asset {
        Some(asset_id) => assets.get(asset_id),
        None => asset_id_from_path(&state.router.location.pathname)
            .and_then(|asset_id| assets.get(&asset_id)),
    }
}

/// Assets passing the current filter
pub fn filtered_assets(state: &AppState) -> Vec<&Asset> {
    state
        .asset
        .assets
        .values()
        .filter(|asset| state.asset.filter.matches(asset))
        .collect()
}

pub fn active_order(state: &AppState) -> Option<&Order> {
    state
        .order
        .active_order
        .as_ref()
        .and_then(|order_id| state.order.orders.get(order_id))
}

pub fn oauth_credential<'a>(
    state: &'a AppState,
    provider_key: &str,
) -> Option<&'a OAuthCredential> {
    state.oauth_accounts.get(provider_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_sync::state::reduce;
    use crate::core_sync::transition::{AssetMap, Transition};
    use crate::core_sync::types::{AccountId, AssetFilter, Location};

    fn with_accounts(names: &[&str]) -> AppState {
        let accounts = names.iter().enumerate().map(|(i, name)| Account::new(*name, i)).collect();
        reduce(&AppState::default(), Transition::AccountsSet(accounts))
    }

    fn with_assets(state: &AppState, ids: &[(&str, &str)]) -> AppState {
        let assets: AssetMap =
            ids.iter().map(|(id, name)| (AssetId::new(*id), Asset::new(*id, *name))).collect();
        reduce(state, Transition::AssetsSet(assets))
    }

    #[test]
    fn test_no_active_account_on_empty_list() {
        let state = AppState::default();
        assert!(active_account(&state).is_none());

        let state = reduce(&state, Transition::ActiveAccountSet(Some(AccountId::new("0xabc"))));
        assert!(active_account(&state).is_none());
    }

    #[test]
    fn test_default_active_account_is_first() {
        let state = with_accounts(&["0xaaa", "0xbbb"]);
        assert_eq!(active_account(&state).unwrap().name.as_str(), "0xaaa");
    }

    #[test]
    fn test_explicit_and_stale_selection() {
        let state = with_accounts(&["0xaaa", "0xbbb"]);
        let state = reduce(&state, Transition::ActiveAccountSet(Some(AccountId::new("0xbbb"))));
        assert_eq!(active_account(&state).unwrap().name.as_str(), "0xbbb");

        // The node no longer reports the selected account.
        let state = reduce(&state, Transition::AccountsSet(vec![Account::new("0xaaa", 0)]));
        assert!(active_account(&state).is_none());
    }

    #[test]
    fn test_asset_id_from_path() {
        assert_eq!(asset_id_from_path("/asset/did:op:42"), Some(AssetId::new("did:op:42")));
        assert_eq!(asset_id_from_path("/a-1"), Some(AssetId::new("a-1")));
        assert_eq!(asset_id_from_path("C:\\assets\\a-2"), Some(AssetId::new("a-2")));
        assert_eq!(asset_id_from_path("/assets/"), None);
        assert_eq!(asset_id_from_path("/"), None);
        assert_eq!(asset_id_from_path(""), None);
        assert_eq!(asset_id_from_path("a-1"), None);
    }

    #[test]
    fn test_active_asset_prefers_explicit_selection() {
        let state = with_assets(&AppState::default(), &[("a-1", "One"), ("a-2", "Two")]);
        let state = reduce(&state, Transition::LocationChanged(Location::new("/asset/a-2")));
        let state = reduce(&state, Transition::ActiveAssetSet(Some(AssetId::new("a-1"))));
        assert_eq!(active_asset(&state).unwrap().metadata.name, "One");
    }

    #[test]
    fn test_active_asset_from_route() {
        let state = with_assets(&AppState::default(), &[("a-1", "One")]);
        let routed = reduce(&state, Transition::LocationChanged(Location::new("/asset/a-1")));
        assert_eq!(active_asset(&routed).unwrap().metadata.name, "One");

        let unknown = reduce(&state, Transition::LocationChanged(Location::new("/asset/zzz")));
        assert!(active_asset(&unknown).is_none());

        let root = reduce(&state, Transition::LocationChanged(Location::new("/")));
        assert!(active_asset(&root).is_none());
    }

    #[test]
    fn test_filtered_assets() {
        let state = with_assets(&AppState::default(), &[("a-1", "Rainfall"), ("a-2", "Traffic")]);
        let state = reduce(&state, Transition::AssetFilterSet(AssetFilter::query("rain")));
        let names: Vec<_> = filtered_assets(&state)
            .iter()
            .map(|a| a.metadata.name.as_str())
            .collect();
        assert_eq!(names, vec!["Rainfall"]);
    }

    #[test]
    fn test_active_order() {
        use crate::core_sync::transition::OrderMap;
        use crate::core_sync::types::{Order, OrderId};

        let orders: OrderMap = [(OrderId::new("o-1"), Order::new("o-1", "a-1"))]
            .into_iter()
            .collect();
        let state = reduce(&AppState::default(), Transition::OrdersSet(orders));
        assert!(active_order(&state).is_none());

        let state = reduce(&state, Transition::ActiveOrderSet(Some(OrderId::new("o-1"))));
        assert_eq!(active_order(&state).unwrap().resource_id.as_str(), "a-1");
    }
}
