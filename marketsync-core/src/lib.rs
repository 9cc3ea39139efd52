pub mod config;
pub mod core_sync;
pub mod logging;
pub mod metrics;
pub mod shutdown;
pub mod telemetry;
pub mod test_utils;

pub use config::Config;
pub use core_sync::{AppState, Store, SyncError, SyncLayer, Transition};
pub use logging::{init_logging, LogLevel};
