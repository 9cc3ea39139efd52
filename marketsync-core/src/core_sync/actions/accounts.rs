//! Account list, selection and faucet

use super::{require_account, require_provider, SyncLayer};
use crate::core_sync::{
    errors::{SyncError, SyncResult},
    policy::Operation,
    transition::Transition,
    types::AccountId,
};
use tracing::{debug, info};

impl SyncLayer {
    /// Replace the account list with the node's
    pub async fn get_accounts(&self) -> SyncResult<()> {
        self.execute(Operation::GetAccounts, None, async {
            let provider = require_provider(&self.store.snapshot())?;
            let accounts = provider
                .market
                .get_accounts()
                .await
                .map_err(SyncError::remote("get_accounts"))?;
            debug!(count = accounts.len(), "Fetched accounts");
            self.store.dispatch(Transition::AccountsSet(accounts)).await;
            Ok(())
        })
        .await
    }

    /// Select an account; `None` falls back to the first one
    pub async fn set_active_account(&self, account: Option<AccountId>) {
        self.store.dispatch(Transition::ActiveAccountSet(account)).await;
    }

    /// Ask the faucet for `amount` tokens on the active account, then refresh
    /// balances
    pub async fn make_it_rain(&self, amount: u64) -> SyncResult<()> {
        self.execute(Operation::MakeItRain, None, async {
            if amount == 0 {
                return Err(SyncError::InvalidAmount(amount));
            }
            let state = self.store.snapshot();
            let provider = require_provider(&state)?;
            let account = require_account(&state)?;

            provider
                .market
                .request_tokens(amount, &account.name)
                .await
                .map_err(SyncError::remote("request_tokens"))?;
            info!(account = %account.name, amount, "Faucet request granted");

            let accounts = provider
                .market
                .get_accounts()
                .await
                .map_err(SyncError::remote("get_accounts"))?;
            self.store.dispatch(Transition::AccountsSet(accounts)).await;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use crate::core_sync::adapters::MockCall;
    use crate::core_sync::selectors;
    use crate::core_sync::types::{Account, AccountId};

    #[tokio::test]
    async fn test_get_accounts_replaces_list() {
        let test = ready_market().await.unwrap();
        assert_eq!(test.layer.snapshot().account.accounts.len(), 2);

        test.market.set_accounts(vec![Account::new("0xccc", 0)]);
        test.layer.get_accounts().await.unwrap();

        let state = test.layer.snapshot();
        assert_eq!(state.account.accounts, vec![Account::new("0xccc", 0)]);
    }

    #[tokio::test]
    async fn test_active_account_selection() {
        let test = ready_market().await.unwrap();
        let state = test.layer.snapshot();
        assert_eq!(selectors::active_account(&state).unwrap().name.as_str(), "0xaaa");

        test.layer.set_active_account(Some(AccountId::new("0xbbb"))).await;
        let state = test.layer.snapshot();
        assert_eq!(selectors::active_account(&state).unwrap().name.as_str(), "0xbbb");

        test.layer.set_active_account(Some(AccountId::new("0xgone"))).await;
        assert!(selectors::active_account(&test.layer.snapshot()).is_none());
    }

    #[tokio::test]
    async fn test_make_it_rain_refreshes_balance() {
        let test = ready_market().await.unwrap();
        test.layer.make_it_rain(10).await.unwrap();

        let state = test.layer.snapshot();
        let account = selectors::active_account(&state).unwrap();
        assert_eq!(account.balance.as_ref().unwrap().ocn, 10);
        assert_eq!(test.market.call_count(MockCall::GetAccounts), 2);
    }

    #[tokio::test]
    async fn test_make_it_rain_without_account_is_noop() {
        let test = test_market();
        test.layer.set_providers().await.unwrap();
        let before = test.layer.snapshot().revision;

        test.layer.make_it_rain(10).await.unwrap();

        assert_eq!(test.layer.snapshot().revision, before);
        assert_eq!(test.market.call_count(MockCall::RequestTokens), 0);
    }

    #[tokio::test]
    async fn test_make_it_rain_rejects_zero() {
        let test = ready_market().await.unwrap();
        test.layer.make_it_rain(0).await.unwrap();
        assert_eq!(test.market.call_count(MockCall::RequestTokens), 0);
    }

    #[tokio::test]
    async fn test_make_it_rain_swallows_remote_failure() {
        let test = ready_market().await.unwrap();
        test.market.fail(MockCall::RequestTokens, "faucet dry");
        let before = test.layer.snapshot().revision;

        test.layer.make_it_rain(10).await.unwrap();
        assert_eq!(test.layer.snapshot().revision, before);
    }
}
