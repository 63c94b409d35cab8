//! `mget-core` -- pure domain logic for the mget exporter.
//!
//! Parsing of `mget_temp` output, device list parsing, series identity and
//! exported metric names. Nothing in this crate performs I/O.

pub mod devices;
pub mod error;
pub mod metric_names;
pub mod reading;
pub mod types;
