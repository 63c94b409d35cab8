//! One sampling pass for one device.
//!
//! A pass optionally fetches the primary reading, then fetches and decodes
//! the sensor table, pushing every decoded row into the [`Registry`]. The
//! two fetches are independent: a failure in one does not stop the other.
//! Failures are logged and never propagate past the pass.

use std::str::FromStr;
use std::sync::Arc;

use mget_core::error::CoreError;
use mget_core::reading::{parse_main_reading, parse_table};
use mget_core::types::{Measurement, SensorKind};

use crate::command::{CommandError, DiagnosticSource};
use crate::registry::Registry;

/// Where a device's main reading comes from. Chosen once per process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MainReadingSource {
    /// A dedicated `mget_temp -d <device>` invocation.
    #[default]
    Command,
    /// The value of the named temperature sensor from the table.
    Sensor(String),
    /// No main reading is exported.
    Disabled,
}

impl FromStr for MainReadingSource {
    type Err = CoreError;

    /// Accepts `command`, `none`, or `sensor:<name>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "command" => Ok(Self::Command),
            "none" => Ok(Self::Disabled),
            _ => match s.strip_prefix("sensor:").map(str::trim) {
                Some(name) if !name.is_empty() => Ok(Self::Sensor(name.to_string())),
                _ => Err(CoreError::Config(format!(
                    "main reading source must be 'command', 'none' or 'sensor:<name>', got '{s}'"
                ))),
            },
        }
    }
}

/// Outcome counters for one pass, mostly useful to tests and debug logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub main_updated: bool,
    pub series_updated: usize,
    pub data_errors: usize,
    pub command_failures: usize,
}

/// Samples devices through a [`DiagnosticSource`] into a shared [`Registry`].
pub struct Sampler<S> {
    source: S,
    registry: Arc<Registry>,
    main_source: MainReadingSource,
}

impl<S: DiagnosticSource> Sampler<S> {
    pub fn new(source: S, registry: Arc<Registry>, main_source: MainReadingSource) -> Self {
        Self {
            source,
            registry,
            main_source,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Run one full pass for `device`.
    pub async fn sample(&self, device: &str) -> PassSummary {
        let mut summary = PassSummary::default();

        if self.main_source == MainReadingSource::Command {
            self.sample_main(device, &mut summary).await;
        }
        self.sample_table(device, &mut summary).await;

        tracing::debug!(
            device,
            main_updated = summary.main_updated,
            series_updated = summary.series_updated,
            data_errors = summary.data_errors,
            command_failures = summary.command_failures,
            "Sampling pass complete",
        );

        summary
    }

    async fn sample_main(&self, device: &str, summary: &mut PassSummary) {
        let output = match self.source.main_reading(device).await {
            Ok(output) => output,
            Err(e) => {
                summary.command_failures += 1;
                log_command_error(device, "main reading", &e);
                return;
            }
        };

        match parse_main_reading(&output) {
            Ok(value) => {
                self.registry.set_main(device, value);
                summary.main_updated = true;
            }
            Err(e) => {
                summary.data_errors += 1;
                tracing::error!(device, error = %e, "Error parsing main temperature");
            }
        }
    }

    async fn sample_table(&self, device: &str, summary: &mut PassSummary) {
        let output = match self.source.sensor_table(device).await {
            Ok(output) => output,
            Err(e) => {
                summary.command_failures += 1;
                log_command_error(device, "sensor table", &e);
                return;
            }
        };

        let (measurements, errors) = parse_table(device, &output);

        for e in &errors {
            tracing::error!(device, error = %e, "Dropping malformed sensor row");
        }
        summary.data_errors += errors.len();

        for m in &measurements {
            self.apply(m, summary);
        }
    }

    fn apply(&self, m: &Measurement, summary: &mut PassSummary) {
        let handle = self.registry.ensure_series(&m.key(), m.threshold);
        self.registry.set_value(&handle, m.value);
        summary.series_updated += 1;

        if let MainReadingSource::Sensor(name) = &self.main_source {
            if m.kind == SensorKind::Temperature && &m.sensor == name {
                self.registry.set_main(&m.device, m.value);
                summary.main_updated = true;
            }
        }
    }
}

fn log_command_error(device: &str, what: &str, e: &CommandError) {
    let output = e.output();
    tracing::error!(
        device,
        invocation = what,
        error = %e,
        output = %output,
        output_length = output.len(),
        "Diagnostic command failed",
    );
}
