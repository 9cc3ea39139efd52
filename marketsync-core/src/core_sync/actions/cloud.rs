//! Cloud blob listing

use super::SyncLayer;
use crate::core_sync::{
    errors::{SyncError, SyncResult},
    policy::Operation,
    selectors,
    transition::Transition,
    types::CloudBlob,
};
use tracing::{debug, warn};

impl SyncLayer {
    /// List every blob of every container visible to the stored credential
    ///
    /// Containers are listed one after another; the first failure aborts
    /// the listing and is reported as a `cloud-error`.
    pub async fn get_cloud_files(&self) -> SyncResult<()> {
        let provider_key = self.config.cloud.provider_key.clone();
        self.execute(Operation::GetCloudFiles, Some(&provider_key), async {
            let state = self.store.snapshot();
            let credential = selectors::oauth_credential(&state, &provider_key)
                .ok_or_else(|| SyncError::NoCloudCredential(provider_key.clone()))?;
            if credential.is_expired(self.clock.now()) {
                warn!(provider = %provider_key, "Cloud credential has expired, listing anyway");
            }
            let token = credential.access_token.as_str();

            let containers = self
                .cloud
                .list_containers(token)
                .await
                .map_err(SyncError::ContainerListing)?;

            let mut blobs = Vec::new();
            for container in containers {
                let entries = self
                    .cloud
                    .list_blobs(token, &container.name)
                    .await
                    .map_err(|source| SyncError::BlobListing {
                        container: container.name.clone(),
                        source,
                    })?;
                blobs.extend(entries.into_iter().map(|entry| CloudBlob {
                    container: container.name.clone(),
                    blob_name: entry.name,
                }));
            }
            debug!(count = blobs.len(), "Listed cloud blobs");

            self.store.dispatch(Transition::CloudBlobsSet(blobs)).await;
            Ok(())
        })
        .await
    }

    /// Drop the listed blobs and any reported error
    pub async fn clear_cloud_files(&self) {
        self.store.dispatch(Transition::CloudBlobsCleared).await;
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use crate::core_sync::persistence::SlotStore;
    use crate::core_sync::types::CloudBlob;
    use std::time::Duration;

    async fn with_credential(test: &TestMarket) {
        test.slots.write("oauthAccounts", r#"{"azure":{"access_token":"tok"}}"#).unwrap();
        test.layer.get_oauth_accounts().await.unwrap();
    }

    #[tokio::test]
    async fn test_lists_blobs_across_containers() {
        let test = test_market();
        with_credential(&test).await;
        test.cloud.require_token("tok");

        test.layer.get_cloud_files().await.unwrap();

        let state = test.layer.snapshot();
        assert_eq!(
            state.cloud_storage.blobs,
            vec![
                CloudBlob {
                    container: "datasets".into(),
                    blob_name: "a.csv".into(),
                },
                CloudBlob {
                    container: "datasets".into(),
                    blob_name: "b.csv".into(),
                },
            ]
        );
        assert!(state.cloud_storage.error.is_none());
    }

    #[tokio::test]
    async fn test_without_credential_is_noop() {
        let test = test_market();
        test.layer.get_cloud_files().await.unwrap();

        let state = test.layer.snapshot();
        assert_eq!(state.revision, 0);
        assert!(test.cloud.listed_containers().is_empty());
    }

    #[tokio::test]
    async fn test_container_failure_is_reported() {
        let test = test_market();
        with_credential(&test).await;
        test.cloud.fail_containers("AuthorizationFailure");
        let before = test.layer.snapshot().revision;

        test.layer.get_cloud_files().await.unwrap();

        let state = test.layer.snapshot();
        assert_eq!(state.revision, before + 1);
        assert_eq!(
            state.cloud_storage.error.as_deref(),
            Some("Error listing containers: AuthorizationFailure")
        );
        assert!(state.cloud_storage.blobs.is_empty());
    }

    #[tokio::test]
    async fn test_blob_failure_is_reported() {
        let test = test_market();
        with_credential(&test).await;
        test.cloud.fail_blobs("datasets", "BlobNotFound");

        test.layer.get_cloud_files().await.unwrap();

        assert_eq!(
            test.layer.snapshot().cloud_storage.error.as_deref(),
            Some("Error: BlobNotFound")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_reported() {
        let test = test_market_with(sample_fixture(), Duration::from_millis(50));
        with_credential(&test).await;
        test.cloud.set_delay(Some(Duration::from_secs(1)));

        test.layer.get_cloud_files().await.unwrap();

        let error = test.layer.snapshot().cloud_storage.error.clone().unwrap();
        assert!(error.starts_with("Error: get_cloud_files timed out"), "{}", error);
    }

    #[tokio::test]
    async fn test_clear_resets_blobs_and_error() {
        let test = test_market();
        with_credential(&test).await;
        test.layer.get_cloud_files().await.unwrap();
        test.cloud.fail_containers("denied");
        test.layer.get_cloud_files().await.unwrap();

        test.layer.clear_cloud_files().await;

        let state = test.layer.snapshot();
        assert!(state.cloud_storage.blobs.is_empty());
        assert!(state.cloud_storage.error.is_none());
    }
}
