//! Leaf types shared by the Garments Tracker engine and server.
mod cents;
pub mod helpers;
pub mod op;
mod secret;

pub use cents::{Cents, CentsConversionError};
pub use secret::Secret;
