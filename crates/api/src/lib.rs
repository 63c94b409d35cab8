//! mget exporter HTTP service library.
//!
//! Exposes configuration, shared state, error handling and routes so the
//! binary entrypoint and integration tests build the same application.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
pub mod telemetry;
