//! Asset listing, publishing, purchasing and selection

use super::{require_account, require_provider, SyncLayer};
use crate::core_sync::{
    errors::{SyncError, SyncResult},
    policy::Operation,
    transition::{AssetMap, Transition},
    types::{AssetFilter, AssetForm, AssetId},
};
use crate::telemetry::TraceContext;
use tracing::{debug, info, warn};

impl SyncLayer {
    /// Publish `form` as the active account, then refresh the asset list
    ///
    /// Only the publish decides the result. The refresh runs as its own
    /// `get_assets` step; its failure is logged and leaves the published
    /// asset to the next listing.
    pub async fn put_asset(&self, form: AssetForm) -> SyncResult<()> {
        let name = form.name.clone();
        let context = TraceContext::new();
        self.execute_in(Operation::PutAsset, Some(&name), &context, async {
            let state = self.store.snapshot();
            let provider = require_provider(&state)?;
            let account = require_account(&state)?;

            provider
                .catalog
                .publish(&form, &account, &provider)
                .await
                .map_err(SyncError::remote("publish"))?;
            info!(asset = %form.name, owner = %account.name, "Asset published");
            Ok(())
        })
        .await?;

        let refreshed = self
            .execute_in(Operation::GetAssets, None, &context.child(), self.list_assets())
            .await;
        if let Err(err) = refreshed {
            warn!(asset = %name, error = %err, "Asset list refresh after publish failed");
        }
        Ok(())
    }

    /// Replace the asset mapping with the catalog's listing for the active
    /// account
    pub async fn get_assets(&self) -> SyncResult<()> {
        self.execute(Operation::GetAssets, None, self.list_assets()).await
    }

    async fn list_assets(&self) -> SyncResult<()> {
        let state = self.store.snapshot();
        let provider = require_provider(&state)?;
        let account = require_account(&state)?;

        let listed = provider
            .catalog
            .list(&account, &provider)
            .await
            .map_err(SyncError::remote("list_assets"))?;
        let assets: AssetMap = listed
            .into_iter()
            .map(|asset| (asset.asset_id.clone(), asset))
            .collect();
        debug!(count = assets.len(), "Fetched assets");
        self.store.dispatch(Transition::AssetsSet(assets)).await;
        Ok(())
    }

    /// Buy access to `asset_id` and merge the returned token into its record
    pub async fn purchase_asset(&self, asset_id: AssetId) -> SyncResult<()> {
        let subject = asset_id.to_string();
        self.execute(Operation::PurchaseAsset, Some(&subject), async {
            let state = self.store.snapshot();
            let provider = require_provider(&state)?;
            let account = require_account(&state)?;
            let asset = state
                .asset
                .assets
                .get(&asset_id)
                .cloned()
                .ok_or_else(|| SyncError::AssetNotFound(asset_id.clone()))?;

            let token = provider
                .catalog
                .purchase(&asset, &account, &provider)
                .await
                .map_err(SyncError::remote("purchase"))?;
            info!(asset = %asset_id, consumer = %account.name, "Asset purchased");

            self.store
                .dispatch(Transition::AssetUpdated {
                    asset_id: asset_id.clone(),
                    token,
                })
                .await;
            Ok(())
        })
        .await
    }

    pub async fn set_active_asset(&self, asset_id: Option<AssetId>) {
        self.store.dispatch(Transition::ActiveAssetSet(asset_id)).await;
    }

    pub async fn set_asset_filter(&self, filter: AssetFilter) {
        self.store.dispatch(Transition::AssetFilterSet(filter)).await;
    }
}
