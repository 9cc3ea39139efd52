//! Shutdown coordinator for in-flight sync operations
//!
//! Every sync operation races its work against [`ShutdownCoordinator::cancelled`].
//! The state lives in a watch channel, so an operation that starts after
//! shutdown began is cancelled immediately instead of missing the signal.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Shutdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShuttingDown,
}

/// Broadcasts the shutdown request to all operations
pub struct ShutdownCoordinator {
    state: watch::Sender<ShutdownState>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ShutdownState::Running);
        Self { state }
    }

    /// Request shutdown; idempotent
    pub fn shutdown(&self) {
        let changed = self.state.send_if_modified(|state| {
            if *state == ShutdownState::Running {
                *state = ShutdownState::ShuttingDown;
                true
            } else {
                false
            }
        });

        if changed {
            info!("Initiating shutdown, cancelling in-flight sync operations");
        } else {
            warn!("Shutdown already in progress");
        }
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.state() == ShutdownState::ShuttingDown
    }

    /// Resolves once shutdown has been requested
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this only errs if it was dropped mid-wait.
        let _ = rx.wait_for(|state| *state == ShutdownState::ShuttingDown).await;
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Request shutdown on SIGINT or SIGTERM
#[cfg(unix)]
pub fn install_signal_handlers(coordinator: Arc<ShutdownCoordinator>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }
        coordinator.shutdown();
    });

    Ok(())
}

/// Request shutdown on Ctrl+C
#[cfg(windows)]
pub fn install_signal_handlers(coordinator: Arc<ShutdownCoordinator>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C");
            coordinator.shutdown();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_state() {
        let coordinator = ShutdownCoordinator::new();
        assert_eq!(coordinator.state(), ShutdownState::Running);

        coordinator.shutdown();
        coordinator.shutdown();

        assert!(coordinator.is_shutting_down());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiters() {
        let coordinator = Arc::new(ShutdownCoordinator::new());
        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.cancelled().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        coordinator.shutdown();

        tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_after_shutdown_resolves_immediately() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.shutdown();
        tokio::time::timeout(Duration::from_millis(100), coordinator.cancelled()).await.unwrap();
    }
}
