//! `mget-collector` -- polling and metric lifecycle for the mget exporter.
//!
//! - [`registry`]: the shared table of exported series.
//! - [`command`]: running `mget_temp` (and other tools) with a timeout.
//! - [`sampler`]: one sampling pass for one device.
//! - [`scheduler`]: fan-out of sampling passes on a fixed period.
//! - [`discovery`]: finding devices with `mst status`.

pub mod command;
pub mod discovery;
pub mod registry;
pub mod sampler;
pub mod scheduler;
