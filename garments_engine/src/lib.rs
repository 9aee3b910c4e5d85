//! Garments Tracker Engine
//!
//! The engine behind a small garments marketplace: an account directory with role-based authorization, a product
//! catalog, and the order-and-inventory consistency engine that keeps each product's available stock in step with the
//! orders placed against it.
//!
//! The library is divided into three main sections:
//! 1. Storage contracts ([`traits`]) and their SQLite implementation ([`SqliteDatabase`]). You should never need to
//!    access the database directly; use the public API instead. The data types stored in the database are defined in
//!    [`db_types`] and are public.
//! 2. The public API (`gt_api`): [`AccountApi`], [`CatalogApi`], [`OrderFlowApi`] and [`ReportingApi`]. Each one is
//!    constructed with a backend that implements the traits it needs.
//! 3. The authorization [`guard`], a pure function that decides whether an account may perform an action.
pub mod db_types;
pub mod errors;
pub mod guard;
mod gt_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use gt_api::{
    account_objects,
    accounts_api::AccountApi,
    catalog_api::CatalogApi,
    order_flow_api::{OrderFlowApi, DEFAULT_MAX_RETRIES},
    order_objects,
    product_objects,
    report_objects,
    reporting_api::ReportingApi,
};
pub use traits::{
    AccountApiError,
    AccountManagement,
    CatalogApiError,
    CatalogManagement,
    InventoryError,
    InventoryManagement,
    ReportError,
    ReportingStore,
};
