//! Process configuration loaded from environment variables.
//!
//! Everything here runs once at startup. Any error is fatal: the binary
//! logs it and exits.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mget_collector::discovery::{discover_devices, DiscoveryError};
use mget_collector::sampler::MainReadingSource;
use mget_collector::scheduler::DEFAULT_POLL_INTERVAL;
use mget_core::devices::{parse_device_config, parse_device_list};
use mget_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidVar {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to load {path}: {source}")]
    DeviceFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Device discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("No devices configured")]
    NoDevices,
}

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `6656`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `6656`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_var(&var, "PORT", 6656, "a valid port number")?,
            request_timeout_secs: parse_var(&var, "REQUEST_TIMEOUT_SECS", 30, "a whole number of seconds")?,
        })
    }
}

/// Where the device list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSource {
    /// Comma-separated list from `DEVICES`.
    List(Vec<String>),
    /// Line-oriented file from `DEVICES_FILE`.
    File(PathBuf),
    /// Enumerate with the discovery tool.
    Discover { program: String },
}

/// Polling configuration.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub devices: DeviceSource,
    pub mget_temp_bin: String,
    pub poll_interval: Duration,
    pub command_timeout: Duration,
    pub main_source: MainReadingSource,
}

impl CollectorConfig {
    /// Load from the process environment.
    ///
    /// | Env Var                | Default       |
    /// |------------------------|---------------|
    /// | `DISCOVER_DEVICES`     | `false`       |
    /// | `MST_BIN`              | `mst`         |
    /// | `DEVICES`              | --            |
    /// | `DEVICES_FILE`         | `devices.cfg` |
    /// | `MGET_TEMP_BIN`        | `mget_temp`   |
    /// | `POLL_INTERVAL_SECS`   | `10`          |
    /// | `COMMAND_TIMEOUT_SECS` | `8`           |
    /// | `MAIN_READING_SOURCE`  | `command`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let discover: bool = parse_var(&var, "DISCOVER_DEVICES", false, "true or false")?;

        let devices = if discover {
            DeviceSource::Discover {
                program: var("MST_BIN").unwrap_or_else(|| "mst".into()),
            }
        } else {
            match var("DEVICES").map(|list| parse_device_list(&list)) {
                Some(list) if !list.is_empty() => DeviceSource::List(list),
                _ => DeviceSource::File(
                    var("DEVICES_FILE")
                        .unwrap_or_else(|| "devices.cfg".into())
                        .into(),
                ),
            }
        };

        let poll_secs: u64 = parse_var(
            &var,
            "POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL.as_secs(),
            "a positive number of seconds",
        )?;
        let timeout_secs: u64 =
            parse_var(&var, "COMMAND_TIMEOUT_SECS", 8, "a positive number of seconds")?;
        for (name, value) in [("POLL_INTERVAL_SECS", poll_secs), ("COMMAND_TIMEOUT_SECS", timeout_secs)] {
            if value == 0 {
                return Err(ConfigError::InvalidVar {
                    var: name,
                    expected: "a positive number of seconds",
                    value: "0".into(),
                });
            }
        }

        let main_source = match var("MAIN_READING_SOURCE") {
            Some(raw) => raw.parse()?,
            None => MainReadingSource::default(),
        };

        Ok(Self {
            devices,
            mget_temp_bin: var("MGET_TEMP_BIN").unwrap_or_else(|| "mget_temp".into()),
            poll_interval: Duration::from_secs(poll_secs),
            command_timeout: Duration::from_secs(timeout_secs),
            main_source,
        })
    }

    /// Resolve the configured device source into a non-empty device list.
    pub async fn resolve_devices(&self) -> Result<Vec<String>, ConfigError> {
        let devices = match &self.devices {
            DeviceSource::List(list) => list.clone(),
            DeviceSource::File(path) => load_device_file(path)?,
            DeviceSource::Discover { program } => {
                discover_devices(program, self.command_timeout).await?
            }
        };

        if devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }
        Ok(devices)
    }
}

/// Read a `devices.cfg` style file.
pub fn load_device_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::DeviceFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_device_config(&contents))
}

fn parse_var<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match var(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
            var: name,
            expected,
            value: raw,
        }),
    }
}
