//! Marketplace state synchronization
//!
//! Keeps a client-side view of the marketplace (accounts, assets, orders,
//! OAuth credentials, cloud blobs) consistent with the remote services.
//!
//! # Architecture
//!
//! ```text
//! SyncLayer (actions)
//!   |  facade calls                 transitions
//!   +----------------> facades      ------------> Store --reduce--> AppState
//!                                                   |
//!                                                   +--> watch snapshots --> selectors
//! ```
//!
//! - [`transition`]: descriptors of state changes
//! - [`state`]: the state tree and the pure reducer
//! - [`store`]: serial application of transitions
//! - [`actions`]: async operations against the facades
//! - [`selectors`]: derived reads
//! - [`policy`]: per-operation failure contracts

pub mod actions;
pub mod adapters;
pub mod clock;
pub mod errors;
pub mod facade;
pub mod oauth;
pub mod persistence;
pub mod policy;
pub mod selectors;
pub mod state;
pub mod store;
pub mod transition;
pub mod types;

pub use actions::{denormalize_orders, SyncLayer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{FacadeError, FacadeResult, PersistenceError, SyncError, SyncResult};
pub use facade::{AssetCatalog, CloudStorage, MarketProvider, ProviderConnector, ProviderContext};
pub use persistence::{FileSlotStore, MemorySlotStore, SlotStore};
pub use policy::{FailurePolicy, Operation, OperationContract, PreconditionPolicy};
pub use state::{reduce, AppState};
pub use store::Store;
pub use transition::{AssetMap, OrderMap, Transition, TransitionKind};
pub use types::*;
