/*
    types.rs - Entities held by the sync layer

    Defines:
    - Identifiers for accounts, assets and orders
    - Account, Asset, Order records as returned by the marketplace
    - OAuth credentials and cloud blob entries
    - Router location and asset filter
*/

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }
    };
}

string_id!(
    /// Account address as reported by the node
    AccountId
);
string_id!(
    /// Unique asset key across the session
    AssetId
);
string_id!(
    /// Unique order key
    OrderId
);

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Current wall clock time; clamps to zero if the clock is before the epoch
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Timestamp(millis)
    }

    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token balances of one account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub eth: u64,
    pub ocn: u64,
}

/// Account known to the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Address, also the account's identity for faucet and order queries
    pub name: AccountId,
    pub display_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Balance>,
}

impl Account {
    pub fn new(name: impl Into<String>, display_index: usize) -> Self {
        Self {
            name: AccountId::new(name),
            display_index,
            balance: None,
        }
    }

    pub fn with_balance(mut self, eth: u64, ocn: u64) -> Self {
        self.balance = Some(Balance { eth, ocn });
        self
    }
}

/// Descriptive metadata of an asset; unknown fields are kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Access token handed out by a successful purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenArtifact(pub String);

/// Published asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,
    pub metadata: AssetMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenArtifact>,
}

impl Asset {
    pub fn new(asset_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            asset_id: AssetId::new(asset_id),
            metadata: AssetMetadata {
                name: name.into(),
                ..Default::default()
            },
            token: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = description.into();
        self
    }
}

/// Validated publish form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetForm {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub content_urls: Vec<String>,
    #[serde(default)]
    pub price: u64,
}

/// Purchase order placed by a consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub resource_id: AssetId,
    /// Display name joined from the asset mapping at fetch time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    pub fn new(id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            id: OrderId::new(id),
            resource_id: AssetId::new(resource_id),
            asset_name: None,
            extra: Map::new(),
        }
    }
}

/// Stored OAuth grant for one provider
///
/// Everything the redirect fragment carried is kept; `expires_on` is an
/// absolute epoch in milliseconds computed once when the grant is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredential {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl OAuthCredential {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.expires_on, Some(expires_on) if expires_on <= now.as_millis())
    }
}

/// Provider key → credential
pub type OAuthAccounts = BTreeMap<String, OAuthCredential>;

/// Blob container as listed by cloud storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
}

/// Blob entry inside one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobEntry {
    pub name: String,
}

/// Flattened cloud file offered to the publish form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudBlob {
    pub container: String,
    pub blob_name: String,
}

/// Current route of the embedding view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    #[serde(default)]
    pub hash: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            hash: String::new(),
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }
}

/// Asset list filter; an empty query matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFilter {
    pub query: String,
    /// Keep only assets already purchased in this session
    #[serde(default)]
    pub purchased_only: bool,
}

impl AssetFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            purchased_only: false,
        }
    }

    /// Case-insensitive match against name and description
    pub fn matches(&self, asset: &Asset) -> bool {
        if self.purchased_only && asset.token.is_none() {
            return false;
        }
        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || asset.metadata.name.to_lowercase().contains(&query)
            || asset.metadata.description.to_lowercase().contains(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_without_asset_name_omits_field() {
        let order = Order::new("o-1", "a-1");
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("asset_name").is_none());
        assert_eq!(json["resource_id"], "a-1");
    }

    #[test]
    fn test_asset_metadata_keeps_unknown_fields() {
        let json = r#"{"asset_id":"a-1","metadata":{"name":"Weather","license":"CC0"}}"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.metadata.name, "Weather");
        assert_eq!(asset.metadata.extra["license"], "CC0");
        assert!(asset.token.is_none());
    }

    #[test]
    fn test_credential_expiry() {
        let credential = OAuthCredential {
            expires_on: Some(1_000),
            ..Default::default()
        };
        assert!(!credential.is_expired(Timestamp::from_millis(999)));
        assert!(credential.is_expired(Timestamp::from_millis(1_000)));
        assert!(!OAuthCredential::default().is_expired(Timestamp::from_millis(u64::MAX)));
    }

    #[test]
    fn test_filter_matches() {
        let asset = Asset::new("a-1", "Ocean Temperatures").with_description("buoy readings");
        assert!(AssetFilter::default().matches(&asset));
        assert!(AssetFilter::query("ocean").matches(&asset));
        assert!(AssetFilter::query("BUOY").matches(&asset));
        assert!(!AssetFilter::query("traffic").matches(&asset));

        let purchased_only = AssetFilter {
            query: String::new(),
            purchased_only: true,
        };
        assert!(!purchased_only.matches(&asset));
    }
}
