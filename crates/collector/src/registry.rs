//! Process-wide table of exported series.
//!
//! [`Registry`] owns a dedicated `prometheus::Registry` with three gauge
//! families (main temperature, diode temperature, diode voltage) and a
//! table mapping each [`SeriesKey`] to the gauge that backs it.
//!
//! Locking: the table sits behind an `RwLock` that is only taken for write
//! on the create path. Updates go straight to the gauge, which is an atomic
//! `f64`, so updates to different series never contend and concurrent
//! updates to the same series are last-writer-wins. Snapshot reads take
//! the read side, which makes series creation atomic with respect to
//! scrapes.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use prometheus::proto::MetricFamily;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, TextEncoder};

use mget_core::metric_names::{
    HELP_DIODE_TEMP, HELP_DIODE_VOLTAGE, HELP_MAIN_TEMP, LABEL_DEVICE, LABEL_DIODE,
    LABEL_THRESHOLD, METRIC_DIODE_TEMP, METRIC_DIODE_VOLTAGE, METRIC_MAIN_TEMP,
};
use mget_core::types::{threshold_label, SensorKind, SeriesKey};

/// Errors from the underlying metrics library.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Metrics registry error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// One per-sensor series. The threshold is fixed when the series is created.
#[derive(Debug)]
struct Series {
    key: SeriesKey,
    threshold: f64,
    gauge: Gauge,
}

/// Handle to a per-sensor series returned by [`Registry::ensure_series`].
///
/// Two handles compare equal only if they refer to the same stored series.
#[derive(Debug, Clone)]
pub struct SeriesHandle(Arc<Series>);

impl SeriesHandle {
    /// Threshold captured on first observation.
    pub fn threshold(&self) -> f64 {
        self.0.threshold
    }

    pub fn value(&self) -> f64 {
        self.0.gauge.get()
    }
}

impl PartialEq for SeriesHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SeriesHandle {}

/// Point-in-time view of one per-sensor series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub key: SeriesKey,
    pub threshold: f64,
    pub value: f64,
}

/// The exporter's metric table. Create once at startup and share via `Arc`.
pub struct Registry {
    registry: prometheus::Registry,
    main_temp: GaugeVec,
    diode_temp: GaugeVec,
    diode_voltage: GaugeVec,
    series: RwLock<BTreeMap<SeriesKey, Arc<Series>>>,
    main: RwLock<BTreeMap<String, Gauge>>,
}

impl Registry {
    /// Build an empty registry with all metric families registered.
    pub fn new() -> Result<Self, RegistryError> {
        let registry = prometheus::Registry::new();

        let diode_temp = GaugeVec::new(
            Opts::new(METRIC_DIODE_TEMP, HELP_DIODE_TEMP),
            &[LABEL_DEVICE, LABEL_DIODE, LABEL_THRESHOLD],
        )?;
        let diode_voltage = GaugeVec::new(
            Opts::new(METRIC_DIODE_VOLTAGE, HELP_DIODE_VOLTAGE),
            &[LABEL_DEVICE, LABEL_DIODE, LABEL_THRESHOLD],
        )?;
        let main_temp = GaugeVec::new(Opts::new(METRIC_MAIN_TEMP, HELP_MAIN_TEMP), &[LABEL_DEVICE])?;

        registry.register(Box::new(diode_temp.clone()))?;
        registry.register(Box::new(diode_voltage.clone()))?;
        registry.register(Box::new(main_temp.clone()))?;

        Ok(Self {
            registry,
            main_temp,
            diode_temp,
            diode_voltage,
            series: RwLock::new(BTreeMap::new()),
            main: RwLock::new(BTreeMap::new()),
        })
    }

    /// Return the series for `key`, creating it with `threshold` if absent.
    ///
    /// When the series already exists the supplied threshold is ignored.
    pub fn ensure_series(&self, key: &SeriesKey, threshold: f64) -> SeriesHandle {
        if let Some(series) = self.read_series().get(key) {
            return SeriesHandle(Arc::clone(series));
        }

        let mut table = self.write_series();
        let series = table.entry(key.clone()).or_insert_with(|| {
            let label = threshold_label(threshold);
            let gauge = self
                .family(key.kind)
                .with_label_values(&[key.device.as_str(), key.sensor.as_str(), label.as_str()]);
            tracing::debug!(
                device = %key.device,
                sensor = %key.sensor,
                kind = %key.kind,
                threshold = %label,
                "Created series",
            );
            Arc::new(Series {
                key: key.clone(),
                threshold,
                gauge,
            })
        });
        SeriesHandle(Arc::clone(series))
    }

    /// Overwrite the current value of a series.
    pub fn set_value(&self, handle: &SeriesHandle, value: f64) {
        handle.0.gauge.set(value);
    }

    /// Make the main reading series for `device` visible, starting at 0.
    pub fn ensure_main(&self, device: &str) -> Gauge {
        if let Some(gauge) = self.read_main().get(device) {
            return gauge.clone();
        }

        let mut table = self.write_main();
        table
            .entry(device.to_string())
            .or_insert_with(|| self.main_temp.with_label_values(&[device]))
            .clone()
    }

    /// Set the main reading for `device`, creating its series if needed.
    pub fn set_main(&self, device: &str, value: f64) {
        self.ensure_main(device).set(value);
    }

    /// Current main reading for `device`, if its series exists.
    pub fn main_value(&self, device: &str) -> Option<f64> {
        self.read_main().get(device).map(Gauge::get)
    }

    /// Current value of the per-sensor series for `key`, if it exists.
    pub fn value(&self, key: &SeriesKey) -> Option<f64> {
        self.read_series().get(key).map(|s| s.gauge.get())
    }

    /// Number of per-sensor series ever created.
    pub fn series_count(&self) -> usize {
        self.read_series().len()
    }

    /// All per-sensor series ordered by key.
    pub fn snapshot(&self) -> Vec<SeriesSnapshot> {
        self.read_series()
            .values()
            .map(|s| SeriesSnapshot {
                key: s.key.clone(),
                threshold: s.threshold,
                value: s.gauge.get(),
            })
            .collect()
    }

    /// Gather every metric family for exposition.
    ///
    /// Families come back sorted by name and series sorted by label values.
    pub fn gather(&self) -> Vec<MetricFamily> {
        let _series = self.read_series();
        let _main = self.read_main();
        self.registry.gather()
    }

    /// Encode the current state in the Prometheus text format.
    ///
    /// Returns the body together with its content type.
    pub fn render(&self) -> Result<(Vec<u8>, String), RegistryError> {
        let encoder = TextEncoder::new();
        let families = self.gather();
        let mut buf = Vec::new();
        encoder.encode(&families, &mut buf)?;
        Ok((buf, encoder.format_type().to_string()))
    }

    fn family(&self, kind: SensorKind) -> &GaugeVec {
        match kind {
            SensorKind::Temperature => &self.diode_temp,
            SensorKind::Voltage => &self.diode_voltage,
        }
    }

    fn read_series(&self) -> RwLockReadGuard<'_, BTreeMap<SeriesKey, Arc<Series>>> {
        self.series.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_series(&self) -> RwLockWriteGuard<'_, BTreeMap<SeriesKey, Arc<Series>>> {
        self.series.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_main(&self) -> RwLockReadGuard<'_, BTreeMap<String, Gauge>> {
        self.main.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_main(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Gauge>> {
        self.main.write().unwrap_or_else(PoisonError::into_inner)
    }
}
