use std::sync::Arc;

use mget_collector::registry::Registry;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Metric table written by the poll scheduler and read on scrape.
    pub registry: Arc<Registry>,
    /// Devices being polled, in configuration order.
    pub devices: Arc<[String]>,
    pub config: Arc<ServerConfig>,
}
