//! Exported metric family names, label names and help strings.
//!
//! The exposition format is consumed by existing dashboards, so these are
//! part of the external contract.

/// Main (overall) temperature per device.
pub const METRIC_MAIN_TEMP: &str = "mget_temp";
pub const HELP_MAIN_TEMP: &str =
    "Main temperature reading from the network adapter (direct reading from mget_temp -d DEVICE)";

/// Per-diode temperature in degrees Celsius.
pub const METRIC_DIODE_TEMP: &str = "mget_thermal_diode_temp_celsius";
pub const HELP_DIODE_TEMP: &str = "Temperature from thermal diode in Celsius. The threshold label contains the maximum allowed temperature as an unsigned integer.";

/// Per-diode voltage in volts.
pub const METRIC_DIODE_VOLTAGE: &str = "mget_thermal_diode_voltage_volts";
pub const HELP_DIODE_VOLTAGE: &str = "Voltage from thermal diode in Volts. The threshold label contains the maximum allowed voltage as an unsigned integer.";

pub const LABEL_DEVICE: &str = "device";
pub const LABEL_DIODE: &str = "diode";
pub const LABEL_THRESHOLD: &str = "threshold";

