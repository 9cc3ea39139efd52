//! One CLI invocation: bootstrap the sync layer, run a command, report state

use crate::cli::Command;
use anyhow::{Context, Result};
use marketsync_core::core_sync::adapters::{
    MarketplaceFixture, MockCloudStorage, MockMarketplace,
};
use marketsync_core::core_sync::{
    AccountId, AssetFilter, AssetForm, AssetId, FileSlotStore, Location, SyncLayer,
};
use marketsync_core::shutdown::ShutdownCoordinator;
use marketsync_core::Config;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Session {
    layer: SyncLayer,
}

impl Session {
    /// Wire the sync layer to the in-memory marketplace described by
    /// `fixture` and to file slots under the configured data dir
    pub fn open(
        config: Config,
        fixture: MarketplaceFixture,
        shutdown: Arc<ShutdownCoordinator>,
    ) -> Self {
        let slots = Arc::new(FileSlotStore::new(config.store.data_dir.clone()));
        let cloud = Arc::new(MockCloudStorage::new(fixture.containers.clone()));
        let market = Arc::new(MockMarketplace::new(fixture));

        let layer =
            SyncLayer::new(Arc::new(config), market, cloud, slots).with_shutdown(shutdown);
        Self { layer }
    }

    #[cfg(test)]
    pub fn layer(&self) -> &SyncLayer {
        &self.layer
    }

    /// Connect, load accounts and stored credentials
    pub async fn bootstrap(&self) -> Result<()> {
        self.layer
            .set_providers()
            .await
            .context("provider bootstrap failed")?;
        self.layer
            .get_accounts()
            .await
            .context("loading accounts failed")?;
        self.layer
            .get_oauth_accounts()
            .await
            .context("loading OAuth accounts failed")?;
        debug!(revision = self.layer.snapshot().revision, "Bootstrap complete");
        Ok(())
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        let layer = &self.layer;
        match command {
            Command::Accounts { select } => {
                if let Some(account) = select {
                    layer.set_active_account(Some(AccountId::new(account))).await;
                }
            }
            Command::Assets { query, purchased } => {
                layer.get_assets().await?;
                layer
                    .set_asset_filter(AssetFilter {
                        query: query.unwrap_or_default(),
                        purchased_only: purchased,
                    })
                    .await;
            }
            Command::Orders => {
                layer.get_assets().await?;
                layer.get_orders().await?;
            }
            Command::Faucet { amount } => {
                let amount = amount.unwrap_or(layer.config().sync.faucet_amount);
                layer.make_it_rain(amount).await?;
            }
            Command::Publish {
                name,
                description,
                urls,
                price,
            } => {
                let form = AssetForm {
                    name,
                    description,
                    content_urls: urls,
                    price,
                };
                layer.put_asset(form).await?;
            }
            Command::Purchase { asset_id } => {
                layer.get_assets().await?;
                layer.purchase_asset(AssetId::new(asset_id)).await?;
            }
            Command::OauthCallback { redirect } => {
                layer.navigate(parse_redirect(&redirect)).await;
                layer.update_oauth_accounts().await?;
            }
            Command::CloudFiles { clear } => {
                if clear {
                    layer.clear_cloud_files().await;
                } else {
                    layer.get_cloud_files().await?;
                }
            }
            Command::Snapshot => {}
        }

        info!(revision = layer.snapshot().revision, "Command finished");
        Ok(())
    }

    /// Current state as pretty JSON
    pub fn render(&self) -> Result<String> {
        serde_json::to_string_pretty(&*self.layer.snapshot())
            .context("serializing state failed")
    }
}

/// Split `path#fragment` into a route location
pub fn parse_redirect(redirect: &str) -> Location {
    match redirect.split_once('#') {
        Some((path, fragment)) => Location::new(path).with_hash(format!("#{}", fragment)),
        None => Location::new(redirect),
    }
}

/// Read a marketplace fixture; no path means an empty marketplace
pub fn load_fixture(path: Option<&Path>) -> Result<MarketplaceFixture> {
    let Some(path) = path else {
        return Ok(MarketplaceFixture::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixture {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing fixture {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FIXTURE: &str = r#"{
        "network_name": "Spree",
        "accounts": [{"name": "0xaaa", "display_index": 0}],
        "assets": [{"asset_id": "did:op:1", "metadata": {"name": "Rainfall", "license": "CC0"}}],
        "orders": {"0xaaa": [{"id": "o-1", "resource_id": "did:op:1", "price": 3}]},
        "containers": {"datasets": ["a.csv"]}
    }"#;

    fn session(data_dir: &Path) -> Session {
        let mut config = Config::default();
        config.store.data_dir = data_dir.to_path_buf();
        let fixture = serde_json::from_str(FIXTURE).unwrap();
        Session::open(config, fixture, Arc::new(ShutdownCoordinator::new()))
    }

    #[test]
    fn test_parse_redirect() {
        let location = parse_redirect("/oauth/azure#access_token=t&expires_in=10");
        assert_eq!(location.pathname, "/oauth/azure");
        assert_eq!(location.hash, "#access_token=t&expires_in=10");
        assert_eq!(parse_redirect("/assets").hash, "");
    }

    #[test]
    fn test_load_fixture() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("market.json");
        std::fs::write(&path, FIXTURE).unwrap();

        let fixture = load_fixture(Some(&path)).unwrap();
        assert_eq!(fixture.accounts.len(), 1);
        assert!(load_fixture(None).unwrap().assets.is_empty());
        assert!(load_fixture(Some(&dir.path().join("missing.json"))).is_err());
    }

    #[tokio::test]
    async fn test_orders_command_renders_denormalized_orders() {
        let dir = tempdir().unwrap();
        let session = session(dir.path());
        session.bootstrap().await.unwrap();
        session.run(Command::Orders).await.unwrap();

        let rendered: serde_json::Value =
            serde_json::from_str(&session.render().unwrap()).unwrap();
        assert_eq!(rendered["order"]["orders"]["o-1"]["asset_name"], "Rainfall");
        assert_eq!(rendered["order"]["orders"]["o-1"]["price"], 3);
    }

    #[tokio::test]
    async fn test_credentials_survive_between_invocations() {
        let dir = tempdir().unwrap();

        let first = session(dir.path());
        first.bootstrap().await.unwrap();
        first
            .run(Command::OauthCallback {
                redirect: "/oauth/azure#access_token=tok&expires_in=60".into(),
            })
            .await
            .unwrap();

        let second = session(dir.path());
        second.bootstrap().await.unwrap();
        second.run(Command::CloudFiles { clear: false }).await.unwrap();

        let state = second.layer().snapshot();
        assert_eq!(state.oauth_accounts["azure"].access_token, "tok");
        assert_eq!(state.cloud_storage.blobs.len(), 1);
    }

    #[tokio::test]
    async fn test_purchase_unknown_asset_fails() {
        let dir = tempdir().unwrap();
        let session = session(dir.path());
        session.bootstrap().await.unwrap();

        let result = session
            .run(Command::Purchase {
                asset_id: "did:op:404".into(),
            })
            .await;
        assert!(result.is_err());
    }
}
