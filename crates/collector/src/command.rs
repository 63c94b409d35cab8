//! External diagnostic command execution.
//!
//! [`DiagnosticSource`] is the seam between the sampler and the outside
//! world. [`MgetTemp`] is the production implementation that shells out to
//! `mget_temp`; tests substitute scripted output.
//!
//! Every invocation is bounded by a timeout. The child is killed if the
//! timeout elapses, so a wedged device cannot pile up processes across
//! ticks.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

/// Failure to obtain output from an external command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with status {code}")]
    NonZeroExit {
        program: String,
        code: i32,
        output: String,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

impl CommandError {
    /// Output captured before the failure, empty if none was collected.
    pub fn output(&self) -> &str {
        match self {
            Self::NonZeroExit { output, .. } => output,
            Self::Spawn { .. } | Self::Timeout { .. } => "",
        }
    }
}

/// Source of raw diagnostic output for a device.
#[async_trait]
pub trait DiagnosticSource: Send + Sync {
    /// Output of the primary-reading invocation (a single number).
    async fn main_reading(&self, device: &str) -> Result<String, CommandError>;

    /// Output of the verbose invocation (header plus sensor table).
    async fn sensor_table(&self, device: &str) -> Result<String, CommandError>;
}

#[async_trait]
impl<T: DiagnosticSource + ?Sized> DiagnosticSource for std::sync::Arc<T> {
    async fn main_reading(&self, device: &str) -> Result<String, CommandError> {
        (**self).main_reading(device).await
    }

    async fn sensor_table(&self, device: &str) -> Result<String, CommandError> {
        (**self).sensor_table(device).await
    }
}

/// Runs the `mget_temp` binary.
#[derive(Debug, Clone)]
pub struct MgetTemp {
    program: String,
    timeout: Duration,
}

impl MgetTemp {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DiagnosticSource for MgetTemp {
    async fn main_reading(&self, device: &str) -> Result<String, CommandError> {
        run_command(&self.program, &["-d", device], self.timeout).await
    }

    async fn sensor_table(&self, device: &str) -> Result<String, CommandError> {
        run_command(&self.program, &["-d", device, "-v"], self.timeout).await
    }
}

/// Run `program` with `args` and return stdout followed by stderr.
///
/// A non-zero exit is an error carrying the captured output. Exit by
/// signal is reported with code `-1`.
pub async fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, CommandError> {
    let result = tokio::time::timeout(
        timeout,
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output(),
    )
    .await;

    let output = match result {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(CommandError::Spawn {
                program: program.to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(CommandError::Timeout {
                program: program.to_string(),
                timeout,
            })
        }
    };

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        Ok(combined)
    } else {
        Err(CommandError::NonZeroExit {
            program: program.to_string(),
            code: output.status.code().unwrap_or(-1),
            output: combined,
        })
    }
}
