//! Fixed-cadence polling of every configured device.
//!
//! Each tick spawns one independent task per device and returns to the
//! timer without waiting for them. A slow device can therefore have
//! overlapping passes in flight; the registry tolerates that. Failed passes
//! are not retried, the next tick simply tries again.
//!
//! Spawned tasks are tracked so shutdown can give in-flight passes a
//! bounded grace period before abandoning them.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::command::DiagnosticSource;
use crate::sampler::Sampler;

/// Reference polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Drives a [`Sampler`] across all devices on a fixed period.
pub struct Scheduler<S> {
    sampler: Arc<Sampler<S>>,
    devices: Vec<String>,
    interval: Duration,
    tracker: TaskTracker,
}

impl<S: DiagnosticSource + 'static> Scheduler<S> {
    pub fn new(sampler: Arc<Sampler<S>>, devices: Vec<String>, interval: Duration) -> Self {
        Self {
            sampler,
            devices,
            interval,
            tracker: TaskTracker::new(),
        }
    }

    /// Number of sampling passes currently in flight.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Spawn one sampling pass per device and return immediately.
    ///
    /// Returns the number of tasks spawned.
    pub fn tick(&self) -> usize {
        for device in &self.devices {
            let sampler = Arc::clone(&self.sampler);
            let device = device.clone();
            let span = tracing::debug_span!("sample", device = %device);
            self.tracker.spawn(
                async move {
                    sampler.sample(&device).await;
                }
                .instrument(span),
            );
        }
        self.devices.len()
    }

    /// Poll until `cancel` fires. The first tick happens immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            devices = self.devices.len(),
            interval_secs = self.interval.as_secs(),
            "Poll scheduler started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Poll scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    let spawned = self.tick();
                    tracing::debug!(spawned, in_flight = self.in_flight(), "Poll tick");
                }
            }
        }
    }

    /// Stop accepting new passes and wait up to `grace` for in-flight ones.
    ///
    /// Returns `true` if every pass finished within the grace period.
    /// Passes still running afterwards are abandoned.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(grace, self.tracker.wait())
            .await
            .is_ok();
        if drained {
            tracing::info!("All sampling passes finished");
        } else {
            tracing::warn!(
                in_flight = self.in_flight(),
                "Abandoning sampling passes still in flight",
            );
        }
        drained
    }
}
