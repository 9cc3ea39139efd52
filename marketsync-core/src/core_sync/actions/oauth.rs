//! OAuth credential slot

use super::SyncLayer;
use crate::core_sync::{
    errors::SyncResult,
    oauth::{credential_from_fragment, decode_accounts, encode_accounts},
    policy::Operation,
    transition::Transition,
};
use tracing::{debug, info};

impl SyncLayer {
    /// Load the persisted credentials into state
    pub async fn get_oauth_accounts(&self) -> SyncResult<()> {
        self.execute(Operation::GetOauthAccounts, None, async {
            let raw = self.slots.read(&self.config.store.oauth_slot_key)?;
            let accounts = decode_accounts(raw.as_deref());
            debug!(providers = accounts.len(), "Loaded OAuth accounts");
            self.store.dispatch(Transition::OAuthAccountsSet(accounts)).await;
            Ok(())
        })
        .await
    }

    /// Capture a credential when the current route is the OAuth redirect,
    /// then persist and publish the full mapping
    ///
    /// The slot is written on every call, redirect or not.
    pub async fn update_oauth_accounts(&self) -> SyncResult<()> {
        self.execute(Operation::UpdateOauthAccounts, None, async {
            let state = self.store.snapshot();
            let cloud = &self.config.cloud;
            let mut accounts = state.oauth_accounts.clone();

            let location = &state.router.location;
            if location.pathname == cloud.redirect_path {
                let credential = credential_from_fragment(&location.hash, self.clock.now());
                info!(
                    provider = %cloud.provider_key,
                    expires_on = ?credential.expires_on,
                    "Stored OAuth credential"
                );
                accounts.insert(cloud.provider_key.clone(), credential);
            }

            let encoded = encode_accounts(&accounts)?;
            self.slots.write(&self.config.store.oauth_slot_key, &encoded)?;
            self.store.dispatch(Transition::OAuthAccountsSet(accounts)).await;
            Ok(())
        })
        .await
    }
}
