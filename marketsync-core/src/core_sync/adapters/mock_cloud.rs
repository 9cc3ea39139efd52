//! In-memory blob storage

use crate::core_sync::{
    errors::{FacadeError, FacadeResult},
    facade::CloudStorage,
    types::{BlobEntry, Container},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct CloudState {
    containers: BTreeMap<String, Vec<String>>,
    expected_token: Option<String>,
    container_failure: Option<String>,
    blob_failures: HashMap<String, String>,
    delay: Option<Duration>,
    listed: Vec<String>,
}

/// Blob storage over a fixed container → blob-name map
///
/// When an expected token is set, any other bearer token is refused the way
/// the real service answers an expired grant.
#[derive(Debug, Clone, Default)]
pub struct MockCloudStorage {
    state: Arc<Mutex<CloudState>>,
}

impl MockCloudStorage {
    pub fn new(containers: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CloudState {
                containers,
                ..Default::default()
            })),
        }
    }

    pub fn require_token(&self, token: impl Into<String>) {
        let token = token.into();
        let _ = self.with_state(|state| state.expected_token = Some(token));
    }

    pub fn fail_containers(&self, message: impl Into<String>) {
        let message = message.into();
        let _ = self.with_state(|state| state.container_failure = Some(message));
    }

    pub fn fail_blobs(&self, container: impl Into<String>, message: impl Into<String>) {
        let (container, message) = (container.into(), message.into());
        let _ = self.with_state(|state| state.blob_failures.insert(container, message));
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        let _ = self.with_state(|state| state.delay = delay);
    }

    /// Containers whose blobs were requested, in call order
    pub fn listed_containers(&self) -> Vec<String> {
        self.with_state(|state| state.listed.clone()).unwrap_or_default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut CloudState) -> R) -> FacadeResult<R> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| FacadeError::new("mock cloud state poisoned"))?;
        Ok(f(&mut state))
    }

    async fn pause(&self) -> FacadeResult<()> {
        if let Some(delay) = self.with_state(|state| state.delay)? {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn authorize(state: &CloudState, access_token: &str) -> FacadeResult<()> {
        match &state.expected_token {
            Some(expected) if expected != access_token => {
                Err(FacadeError::new("AuthenticationFailed"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CloudStorage for MockCloudStorage {
    async fn list_containers(&self, access_token: &str) -> FacadeResult<Vec<Container>> {
        self.pause().await?;
        self.with_state(|state| {
            Self::authorize(state, access_token)?;
            if let Some(message) = &state.container_failure {
                return Err(FacadeError::new(message.clone()));
            }
            Ok(state
                .containers
                .keys()
                .map(|name| Container { name: name.clone() })
                .collect())
        })?
    }

    async fn list_blobs(
        &self,
        access_token: &str,
        container: &str,
    ) -> FacadeResult<Vec<BlobEntry>> {
        self.pause().await?;
        self.with_state(|state| {
            state.listed.push(container.to_string());
            Self::authorize(state, access_token)?;
            if let Some(message) = state.blob_failures.get(container) {
                return Err(FacadeError::new(message.clone()));
            }
            let blobs = state
                .containers
                .get(container)
                .ok_or_else(|| FacadeError::new(format!("ContainerNotFound: {}", container)))?;
            Ok(blobs.iter().map(|name| BlobEntry { name: name.clone() }).collect())
        })?
    }
}
