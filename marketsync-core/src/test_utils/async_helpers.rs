//! Async test helpers
//!
//! Timeout utilities and helpers for waiting on published state snapshots.

use crate::core_sync::AppState;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{timeout, Duration};

/// Run a future with a timeout, returning Ok(result) or Err on timeout
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    timeout(duration, future).await.map_err(|_| TimeoutError::Elapsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutError {
    Elapsed,
    /// The store was dropped while waiting
    Closed,
}

impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutError::Elapsed => write!(f, "operation timed out"),
            TimeoutError::Closed => write!(f, "state channel closed"),
        }
    }
}

impl std::error::Error for TimeoutError {}

/// Wait until a published snapshot satisfies `predicate`
pub async fn wait_for_state<P>(
    rx: &mut watch::Receiver<Arc<AppState>>,
    duration: Duration,
    mut predicate: P,
) -> Result<Arc<AppState>, TimeoutError>
where
    P: FnMut(&AppState) -> bool,
{
    let waited = timeout(duration, rx.wait_for(|state| predicate(state.as_ref()))).await;
    match waited {
        Ok(Ok(state)) => Ok(state.clone()),
        Ok(Err(_)) => Err(TimeoutError::Closed),
        Err(_) => Err(TimeoutError::Elapsed),
    }
}

/// Wait until the store has applied at least `revision` transitions
pub async fn wait_for_revision(
    rx: &mut watch::Receiver<Arc<AppState>>,
    revision: u64,
    duration: Duration,
) -> Result<Arc<AppState>, TimeoutError> {
    wait_for_state(rx, duration, |state| state.revision >= revision).await
}

/// Helper to assert a future completes within duration
pub async fn assert_completes_within<F, T>(duration: Duration, future: F) -> T
where
    F: Future<Output = T>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => panic!("Future did not complete within {:?}", duration),
    }
}

/// Default timeout duration for tests (5 seconds)
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Short timeout for tests that should fail fast (100ms)
pub const SHORT_TEST_TIMEOUT: Duration = Duration::from_millis(100);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_sync::{Store, Transition};

    #[tokio::test]
    async fn test_wait_for_revision() {
        let store = Arc::new(Store::new());
        let mut rx = store.subscribe();

        let writer = store.clone();
        tokio::spawn(async move {
            writer.dispatch(Transition::NetworkNameSet("nile".into())).await;
            writer.dispatch(Transition::CloudBlobsCleared).await;
        });

        let state = wait_for_revision(&mut rx, 2, DEFAULT_TEST_TIMEOUT).await.unwrap();
        assert_eq!(state.account.network_name.as_deref(), Some("nile"));
    }

    #[tokio::test]
    async fn test_wait_for_state_times_out() {
        let store = Store::new();
        let mut rx = store.subscribe();

        let result = wait_for_state(&mut rx, SHORT_TEST_TIMEOUT, |state| state.revision > 0).await;
        assert_eq!(result.unwrap_err(), TimeoutError::Elapsed);
    }

    #[tokio::test]
    async fn test_assert_completes_within() {
        let value = assert_completes_within(SHORT_TEST_TIMEOUT, async { 42 }).await;
        assert_eq!(value, 42);
        let pending = with_timeout(Duration::from_millis(10), std::future::pending::<()>()).await;
        assert!(pending.is_err());
    }
}
