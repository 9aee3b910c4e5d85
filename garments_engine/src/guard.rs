//! # Authorization guard
//!
//! A pure function of the caller's account record and the requested [`Action`]. The guard never caches: callers are
//! expected to re-fetch the account on every request so that role changes and suspensions take effect immediately.
//!
//! | Requirement        | Actions                                                                              |
//! |--------------------|--------------------------------------------------------------------------------------|
//! | Public             | `ReadCatalog`                                                                        |
//! | Authenticated      | `ReadOwnAccount`, `PlaceOrder`, `ReadOrders`, `UpdateOrderStatus`, `EditProduct`,     |
//! |                    | `DeleteProduct`                                                                      |
//! | Active manager     | `CreateProduct`, `AppendTracking`, `RestockProduct`                                  |
//! | Admin              | `ListAccounts`, `UpdateAccount`, `ViewAnalytics`                                     |
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{Account, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    ReadCatalog,
    ReadOwnAccount,
    PlaceOrder,
    ReadOrders,
    UpdateOrderStatus,
    EditProduct,
    DeleteProduct,
    CreateProduct,
    AppendTracking,
    RestockProduct,
    ListAccounts,
    UpdateAccount,
    ViewAnalytics,
}

impl Action {
    pub const ALL: [Action; 13] = [
        Action::ReadCatalog,
        Action::ReadOwnAccount,
        Action::PlaceOrder,
        Action::ReadOrders,
        Action::UpdateOrderStatus,
        Action::EditProduct,
        Action::DeleteProduct,
        Action::CreateProduct,
        Action::AppendTracking,
        Action::RestockProduct,
        Action::ListAccounts,
        Action::UpdateAccount,
        Action::ViewAnalytics,
    ];

    pub fn requirement(&self) -> Requirement {
        match self {
            Action::ReadCatalog => Requirement::Public,
            Action::ReadOwnAccount
            | Action::PlaceOrder
            | Action::ReadOrders
            | Action::UpdateOrderStatus
            | Action::EditProduct
            | Action::DeleteProduct => Requirement::Authenticated,
            Action::CreateProduct | Action::AppendTracking | Action::RestockProduct => Requirement::ActiveManager,
            Action::ListAccounts | Action::UpdateAccount | Action::ViewAnalytics => Requirement::Admin,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    /// A manager whose account has not been suspended.
    ActiveManager,
    Admin,
}

/// Who is asking.
#[derive(Debug, Clone, Copy)]
pub enum Caller<'a> {
    /// No verified identity accompanied the request.
    Anonymous,
    /// The identity was verified, but no account record exists for it.
    Unregistered,
    Registered(&'a Account),
}

impl<'a> From<Option<&'a Account>> for Caller<'a> {
    fn from(account: Option<&'a Account>) -> Self {
        match account {
            Some(account) => Caller::Registered(account),
            None => Caller::Unregistered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("Authentication is required")]
    NotAuthenticated,
    #[error("No account exists for this identity")]
    AccountNotFound,
    #[error("This action requires the {required} role")]
    RoleNotPermitted { required: Role },
    #[error("The account has been suspended")]
    AccountSuspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Decides whether `caller` may perform `action`.
pub fn authorize(caller: Caller<'_>, action: Action) -> Decision {
    let requirement = action.requirement();
    if requirement == Requirement::Public {
        return Decision::Allow;
    }
    let account = match caller {
        Caller::Anonymous => return Decision::Deny(DenyReason::NotAuthenticated),
        Caller::Unregistered => return Decision::Deny(DenyReason::AccountNotFound),
        Caller::Registered(account) => account,
    };
    match requirement {
        Requirement::Public | Requirement::Authenticated => Decision::Allow,
        Requirement::ActiveManager if account.role != Role::Manager => {
            Decision::Deny(DenyReason::RoleNotPermitted { required: Role::Manager })
        },
        Requirement::ActiveManager if account.is_suspended() => Decision::Deny(DenyReason::AccountSuspended),
        Requirement::ActiveManager => Decision::Allow,
        Requirement::Admin if account.role != Role::Admin => {
            Decision::Deny(DenyReason::RoleNotPermitted { required: Role::Admin })
        },
        Requirement::Admin => Decision::Allow,
    }
}

/// Shorthand for callers that have already verified an identity and looked up its account record.
pub fn decide(account: Option<&Account>, action: Action) -> Decision {
    authorize(Caller::from(account), action)
}
