//! # Garments Tracker server
//! This crate hosts the HTTP server for the Garments Tracker marketplace. It is responsible for:
//! * Registering accounts and issuing the bearer credential on login.
//! * Checking every protected request against the authorization guard, using a freshly fetched account record.
//! * Translating requests into calls on the engine APIs, and engine errors into HTTP responses.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/auth/{register,login,logout}`: account registration and session handling.
//! * `/api/products`, `/api/products/home`, `/api/products/{id}`: the public catalog.
//! * `/api/secure/...`: everything that needs a credential. See [routes](routes/index.html).

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
