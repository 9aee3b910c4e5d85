//! SQLite backend for the Garments Tracker engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
