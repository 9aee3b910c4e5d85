//! # Garments Tracker engine public API
//!
//! The `gt_api` module exposes the programmatic API of the engine. It is modular, so that clients can pick the
//! functionality they need, each backed by whichever store implements the relevant trait.
//!
//! * [`accounts_api`] registers and administers accounts.
//! * [`catalog_api`] publishes, edits and lists products.
//! * [`order_flow_api`] places orders and moves them through their lifecycle, keeping stock consistent.
//! * [`reporting_api`] computes the analytics dashboard.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits it needs:
//!
//! ```rust,ignore
//! use garments_engine::{OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/garments.db", 25).await?;
//! // SqliteDatabase implements InventoryManagement
//! let api = OrderFlowApi::new(db);
//! let order = api.place_order(NewOrder::new(ProductId(1), 3, "buyer@example.com")).await?;
//! ```

pub mod account_objects;
pub mod accounts_api;
pub mod catalog_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod product_objects;
pub mod report_objects;
pub mod reporting_api;
