//! # Storage contracts
//!
//! This module defines the behaviour that a storage backend needs to expose in order to back the Garments Tracker
//! engine. [`crate::SqliteDatabase`] implements all of them.
//!
//! * [`AccountManagement`] maintains the account directory.
//! * [`CatalogManagement`] maintains the product catalog (everything except stock levels).
//! * [`InventoryManagement`] places and cancels orders, keeping product stock consistent with the orders placed
//!   against it.
//! * [`ReportingStore`] provides the read-only aggregates behind the analytics view.
mod account_management;
mod catalog_management;
mod inventory_management;
mod reporting;

pub use account_management::{AccountApiError, AccountManagement};
pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use inventory_management::{InventoryError, InventoryManagement};
pub use reporting::{ReportError, ReportingStore};
