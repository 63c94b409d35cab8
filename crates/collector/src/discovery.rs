//! Device auto-discovery through `mst status`.

use std::time::Duration;

use mget_core::devices::parse_discovery_output;

use crate::command::{run_command, CommandError};

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{program} reported no usable devices")]
    NoDevices { program: String },
}

/// Run `<program> status` and return the devices it lists.
///
/// An empty result is an error: there is nothing to poll.
pub async fn discover_devices(
    program: &str,
    timeout: Duration,
) -> Result<Vec<String>, DiscoveryError> {
    let output = run_command(program, &["status"], timeout).await?;
    let devices = parse_discovery_output(&output);

    if devices.is_empty() {
        tracing::warn!(program, output = %output, "Discovery output contained no devices");
        return Err(DiscoveryError::NoDevices {
            program: program.to_string(),
        });
    }

    tracing::info!(program, count = devices.len(), ?devices, "Discovered devices");
    Ok(devices)
}
