//! Sync operations
//!
//! `SyncLayer` owns the store and the facades and exposes one async method
//! per operation. Each method reads a snapshot when it starts, talks to the
//! facades without holding any lock, and reports its result as transitions.
//!
//! Every facade-backed operation runs through [`SyncLayer::execute`], which
//! bounds it by the configured timeout, races it against shutdown and then
//! applies the operation's declared [`OperationContract`]:
//!
//! ```text
//! caller --> execute(op) --> body (facades) --> Ok / SyncError
//!                 |                                  |
//!                 +-- timeout / shutdown ------------+
//!                                                    v
//!                                 contract: NoOp | Fail | Swallow | Propagate | Report
//! ```

mod accounts;
mod assets;
mod cloud;
mod oauth;
mod orders;
mod provider;

pub use orders::denormalize_orders;

use super::{
    clock::{Clock, SystemClock},
    errors::{SyncError, SyncResult},
    facade::{CloudStorage, ProviderConnector, ProviderContext},
    persistence::SlotStore,
    policy::{FailurePolicy, Operation, PreconditionPolicy},
    selectors,
    state::AppState,
    store::Store,
    transition::Transition,
    types::Account,
};
use crate::{
    config::Config,
    metrics,
    shutdown::ShutdownCoordinator,
    telemetry::{TraceContext, TracedOperation},
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, Instrument};

/// Entry point for every sync operation
pub struct SyncLayer {
    store: Arc<Store>,
    connector: Arc<dyn ProviderConnector>,
    cloud: Arc<dyn CloudStorage>,
    slots: Arc<dyn SlotStore>,
    clock: Arc<dyn Clock>,
    shutdown: Arc<ShutdownCoordinator>,
    config: Arc<Config>,
}

impl SyncLayer {
    /// Create a sync layer with an empty store, the system clock and its own
    /// shutdown coordinator
    pub fn new(
        config: Arc<Config>,
        connector: Arc<dyn ProviderConnector>,
        cloud: Arc<dyn CloudStorage>,
        slots: Arc<dyn SlotStore>,
    ) -> Self {
        info!(
            node = %config.provider.node,
            timeout = ?config.sync.operation_timeout,
            "Creating SyncLayer"
        );

        Self {
            store: Arc::new(Store::new()),
            connector,
            cloud,
            slots,
            clock: Arc::new(SystemClock),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Share a coordinator, typically one wired to process signals
    pub fn with_shutdown(mut self, shutdown: Arc<ShutdownCoordinator>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_store(mut self, store: Arc<Store>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Latest applied state
    pub fn snapshot(&self) -> Arc<AppState> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.store.subscribe()
    }

    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `body` under the timeout and shutdown signal, then settle its
    /// result according to `op`'s contract
    async fn execute<F>(&self, op: Operation, subject: Option<&str>, body: F) -> SyncResult<()>
    where
        F: Future<Output = SyncResult<()>>,
    {
        self.execute_in(op, subject, &TraceContext::new(), body).await
    }

    /// Same as [`SyncLayer::execute`], correlated under `context`
    async fn execute_in<F>(
        &self,
        op: Operation,
        subject: Option<&str>,
        context: &TraceContext,
        body: F,
    ) -> SyncResult<()>
    where
        F: Future<Output = SyncResult<()>>,
    {
        let traced = TracedOperation::with_context(op.name(), subject, context);
        let timer = metrics::Timer::new(op.name());
        metrics::record_operation_started(op.name());

        let deadline = self.config.sync.operation_timeout;
        let outcome = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(SyncError::Cancelled(op.name())),
            result = tokio::time::timeout(deadline, body.instrument(traced.span().clone())) => {
                match result {
                    Ok(result) => result,
                    Err(_) => Err(SyncError::Timeout {
                        operation: op.name(),
                        elapsed: deadline,
                    }),
                }
            }
        };
        timer.stop();

        self.settle(op, outcome, traced).await
    }

    async fn settle(
        &self,
        op: Operation,
        outcome: SyncResult<()>,
        traced: TracedOperation,
    ) -> SyncResult<()> {
        let err = match outcome {
            Ok(()) => {
                traced.complete("ok");
                return Ok(());
            }
            Err(err) => err,
        };
        let contract = op.contract();

        if err.is_precondition() {
            return match contract.precondition {
                PreconditionPolicy::NoOp => {
                    info!(operation = %op, reason = %err, "Precondition not met, skipping");
                    metrics::record_operation_skipped(op.name());
                    traced.complete("skipped");
                    Ok(())
                }
                PreconditionPolicy::Fail => {
                    metrics::record_operation_failed(op.name());
                    traced.record_error(&err.to_string());
                    traced.complete("failed");
                    Err(err)
                }
            };
        }

        metrics::record_operation_failed(op.name());
        traced.record_error(&err.to_string());
        match contract.failure {
            FailurePolicy::Swallow => {
                error!(operation = %op, error = %err, "Operation failed");
                traced.complete("swallowed");
                Ok(())
            }
            FailurePolicy::Propagate => {
                traced.complete("failed");
                Err(err)
            }
            FailurePolicy::Report => {
                self.store.dispatch(Transition::CloudError(err.report_message())).await;
                traced.complete("reported");
                Ok(())
            }
        }
    }
}

fn require_provider(state: &AppState) -> SyncResult<ProviderContext> {
    state.provider.clone().ok_or(SyncError::ProviderNotReady)
}

fn require_account(state: &AppState) -> SyncResult<Account> {
    selectors::active_account(state).cloned().ok_or(SyncError::NoActiveAccount)
}
