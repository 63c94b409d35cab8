//! Decoding of `mget_temp` output.
//!
//! The verbose table looks like:
//!
//! ```text
//!  Index  Name     Type  Value   Threshold
//!  0      iopx     T     45.00   105.00
//!  1      vdd_core V     0.85    1.00
//! ```
//!
//! Rows are matched positionally: index, sensor name, one-character kind,
//! value, threshold. Anything that does not have that shape (headers,
//! separators, blank or truncated lines) is skipped without error. Rows
//! that have the shape but carry bad data are reported as [`CoreError`]s so
//! the caller can log them and move on to the next line.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::{Measurement, SensorKind};

/// Regex pattern for one data row of the verbose table.
pub const TABLE_ROW_PATTERN: &str = r"^\s*\d+\s+(\S+)\s+(\S)\s+(\S+)\s+(\S+)";

static TABLE_ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TABLE_ROW_PATTERN).expect("valid regex"));

/// Decode one line of the verbose table for `device`.
///
/// Returns `Ok(None)` for lines that are not data rows and `Err` for data
/// rows with an unknown kind or a non-numeric value/threshold.
pub fn parse_table_line(device: &str, line: &str) -> Result<Option<Measurement>, CoreError> {
    let Some(caps) = TABLE_ROW_RE.captures(line) else {
        return Ok(None);
    };

    let sensor = &caps[1];
    let kind_code = &caps[2];

    let kind = SensorKind::from_code(kind_code).ok_or_else(|| CoreError::UnknownKind {
        sensor: sensor.to_string(),
        kind: kind_code.to_string(),
    })?;
    let value = parse_decimal(sensor, "value", &caps[3])?;
    let threshold = parse_decimal(sensor, "threshold", &caps[4])?;

    Ok(Some(Measurement {
        device: device.to_string(),
        sensor: sensor.to_string(),
        kind,
        value,
        threshold,
    }))
}

/// Decode the whole verbose table. Good rows are returned in order; bad
/// rows are returned separately so one malformed line never hides the rest.
pub fn parse_table(device: &str, output: &str) -> (Vec<Measurement>, Vec<CoreError>) {
    let mut measurements = Vec::new();
    let mut errors = Vec::new();

    for line in output.lines() {
        match parse_table_line(device, line) {
            Ok(Some(m)) => measurements.push(m),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    (measurements, errors)
}

/// Decode the output of the non-verbose invocation, which is a single number.
pub fn parse_main_reading(output: &str) -> Result<f64, CoreError> {
    let trimmed = output.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CoreError::InvalidMainReading(format!(
            "expected a single decimal, got '{trimmed}'"
        ))),
    }
}

fn parse_decimal(sensor: &str, field: &'static str, raw: &str) -> Result<f64, CoreError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CoreError::InvalidNumber {
            sensor: sensor.to_string(),
            field,
            value: raw.to_string(),
        }),
    }
}
