//! `mget-exporter` -- Prometheus exporter for `mget_temp` readings.
//!
//! Polls every configured device with `mget_temp` on a fixed period and
//! serves the latest readings at `/metrics`. See [`mget_api::config`] for
//! the environment variables.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use mget_api::config::{CollectorConfig, ConfigError, ServerConfig};
use mget_api::router::build_app_router;
use mget_api::state::AppState;
use mget_api::telemetry;
use mget_collector::command::MgetTemp;
use mget_collector::registry::{Registry, RegistryError};
use mget_collector::sampler::{MainReadingSource, Sampler};
use mget_collector::scheduler::Scheduler;
use tokio_util::sync::CancellationToken;

/// How long in-flight sampling passes get to finish on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Invalid HOST address '{0}'")]
    InvalidHost(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "mget exporter failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    // --- Configuration ---
    let server_config = ServerConfig::from_env()?;
    let collector_config = CollectorConfig::from_env()?;
    let devices = collector_config.resolve_devices().await?;

    // --- Registry ---
    let registry = Arc::new(Registry::new()?);
    if collector_config.main_source != MainReadingSource::Disabled {
        for device in &devices {
            registry.ensure_main(device);
        }
    }

    // --- Listener ---
    let host: IpAddr = server_config
        .host
        .parse()
        .map_err(|_| StartupError::InvalidHost(server_config.host.clone()))?;
    let addr = SocketAddr::new(host, server_config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    // --- Poll scheduler ---
    let source = MgetTemp::new(
        collector_config.mget_temp_bin.clone(),
        collector_config.command_timeout,
    );
    let sampler = Arc::new(Sampler::new(
        source,
        Arc::clone(&registry),
        collector_config.main_source.clone(),
    ));
    let scheduler = Arc::new(Scheduler::new(
        sampler,
        devices.clone(),
        collector_config.poll_interval,
    ));

    let poll_cancel = CancellationToken::new();
    let poll_handle = {
        let scheduler = Arc::clone(&scheduler);
        let cancel = poll_cancel.clone();
        tokio::spawn(async move { scheduler.run(cancel).await })
    };

    // --- Router ---
    let state = AppState {
        registry,
        devices: devices.into(),
        config: Arc::new(server_config),
    };
    let device_count = state.devices.len();
    let app = build_app_router(state);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        %addr,
        devices = device_count,
        poll_interval_secs = collector_config.poll_interval.as_secs(),
        command_timeout_secs = collector_config.command_timeout.as_secs(),
        main_source = ?collector_config.main_source,
        "Starting mget exporter",
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    poll_cancel.cancel();
    if let Err(e) = poll_handle.await {
        tracing::error!(error = %e, "Poll scheduler task failed");
    }
    scheduler.shutdown(SHUTDOWN_GRACE).await;

    tracing::info!("Shutdown complete");
    served.map_err(StartupError::Serve)
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
///
/// If a handler cannot be installed that signal is ignored and the other
/// one still triggers shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
