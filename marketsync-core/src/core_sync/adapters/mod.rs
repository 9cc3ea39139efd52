//! In-memory facade implementations
//!
//! Used by the tests and by the CLI's fixture mode.

mod mock_cloud;
mod mock_provider;

pub use mock_cloud::MockCloudStorage;
pub use mock_provider::{find_asset, MarketplaceFixture, MockCall, MockMarketplace};
