//! Shared value types for sensor readings and series identity.

use std::fmt;

/// What a sensor measures. Decoded from the single-character kind column
/// of the `mget_temp -v` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensorKind {
    Temperature,
    Voltage,
}

impl SensorKind {
    /// Map a table discriminator (`T` / `V`) to a kind.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "T" => Some(Self::Temperature),
            "V" => Some(Self::Voltage),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Voltage => "voltage",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one tracked series: `(device, sensor, kind)`.
///
/// Ordering is lexicographic over the fields, which gives the exporter a
/// stable enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    pub device: String,
    pub sensor: String,
    pub kind: SensorKind,
}

impl SeriesKey {
    pub fn new(device: impl Into<String>, sensor: impl Into<String>, kind: SensorKind) -> Self {
        Self {
            device: device.into(),
            sensor: sensor.into(),
            kind,
        }
    }
}

/// One decoded table row for one device. Lives for a single sampling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub device: String,
    pub sensor: String,
    pub kind: SensorKind,
    pub value: f64,
    pub threshold: f64,
}

impl Measurement {
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(self.device.clone(), self.sensor.clone(), self.kind)
    }
}

/// Render a threshold the way it appears in the exported `threshold` label:
/// an unsigned integer, truncated toward zero. Negative and non-finite
/// thresholds collapse to `0`.
pub fn threshold_label(threshold: f64) -> String {
    // `as` saturates: NaN and negatives become 0, fractions truncate.
    (threshold as u64).to_string()
}
