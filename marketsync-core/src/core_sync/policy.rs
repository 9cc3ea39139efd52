//! Declared failure handling per sync operation
//!
//! Refresh-style operations fail soft so a background sync never breaks the
//! view; operations carrying user intent (publish, purchase) fail loud.

use std::fmt;

/// What happens when an operation's precondition is not met
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionPolicy {
    /// Log and return without dispatching
    NoOp,
    /// Return the precondition error to the caller
    Fail,
}

/// What happens when a remote call (or its deadline) fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log and return success
    Swallow,
    /// Return the error to the caller
    Propagate,
    /// Dispatch an error transition carrying a display message
    Report,
}

/// Contract of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationContract {
    pub precondition: PreconditionPolicy,
    pub failure: FailurePolicy,
}

/// Every sync operation that talks to a facade or the local slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SetProviders,
    GetAccounts,
    MakeItRain,
    PutAsset,
    GetAssets,
    PurchaseAsset,
    GetOrders,
    GetOauthAccounts,
    UpdateOauthAccounts,
    GetCloudFiles,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SetProviders => "set_providers",
            Operation::GetAccounts => "get_accounts",
            Operation::MakeItRain => "make_it_rain",
            Operation::PutAsset => "put_asset",
            Operation::GetAssets => "get_assets",
            Operation::PurchaseAsset => "purchase_asset",
            Operation::GetOrders => "get_orders",
            Operation::GetOauthAccounts => "get_oauth_accounts",
            Operation::UpdateOauthAccounts => "update_oauth_accounts",
            Operation::GetCloudFiles => "get_cloud_files",
        }
    }

    pub fn contract(&self) -> OperationContract {
        use FailurePolicy::*;
        use PreconditionPolicy::*;

        let (precondition, failure) = match self {
            Operation::SetProviders => (Fail, Propagate),
            Operation::GetAccounts => (Fail, Propagate),
            Operation::MakeItRain => (NoOp, Swallow),
            Operation::PutAsset => (Fail, Propagate),
            Operation::GetAssets => (Fail, Propagate),
            Operation::PurchaseAsset => (Fail, Propagate),
            Operation::GetOrders => (NoOp, Propagate),
            Operation::GetOauthAccounts => (Fail, Propagate),
            Operation::UpdateOauthAccounts => (Fail, Propagate),
            Operation::GetCloudFiles => (NoOp, Report),
        };
        OperationContract {
            precondition,
            failure,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
