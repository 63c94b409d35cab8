#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mget_collector::command::{CommandError, DiagnosticSource};

/// Scripted response for one invocation.
#[derive(Debug, Clone)]
pub enum Reply {
    Output(String),
    Exit(i32, String),
    /// The invocation ran past the command timeout.
    Timeout,
}

impl Reply {
    pub fn ok(s: &str) -> Self {
        Reply::Output(s.to_string())
    }

    fn into_result(self) -> Result<String, CommandError> {
        match self {
            Reply::Output(s) => Ok(s),
            Reply::Exit(code, output) => Err(CommandError::NonZeroExit {
                program: "mget_temp".to_string(),
                code,
                output,
            }),
            Reply::Timeout => Err(CommandError::Timeout {
                program: "mget_temp".to_string(),
                timeout: Duration::from_secs(8),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeviceScript {
    pub main: Reply,
    pub table: Reply,
}

/// A [`DiagnosticSource`] that answers from per-device scripts.
///
/// Unknown devices behave like a missing device (exit 1).
#[derive(Default)]
pub struct FakeSource {
    scripts: Mutex<HashMap<String, DeviceScript>>,
    delay: Option<Duration>,
    pub main_calls: AtomicUsize,
    pub table_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set(&self, device: &str, main: Reply, table: Reply) {
        self.scripts
            .lock()
            .unwrap()
            .insert(device.to_string(), DeviceScript { main, table });
    }

    pub fn table_calls(&self) -> usize {
        self.table_calls.load(Ordering::SeqCst)
    }

    fn script(&self, device: &str) -> Option<DeviceScript> {
        self.scripts.lock().unwrap().get(device).cloned()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn missing() -> Reply {
    Reply::Exit(1, "-E- Device not found".to_string())
}

#[async_trait]
impl DiagnosticSource for FakeSource {
    async fn main_reading(&self, device: &str) -> Result<String, CommandError> {
        self.main_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.script(device).map_or_else(missing, |s| s.main).into_result()
    }

    async fn sensor_table(&self, device: &str) -> Result<String, CommandError> {
        self.table_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.script(device).map_or_else(missing, |s| s.table).into_result()
    }
}

pub const TABLE_A: &str = "\
 Index  Name   Type  Value  Threshold
 -----  ----   ----  -----  ---------
 1      iopx   T     45.0   90
 2      pcie   T     51.5   105.8
 3      vdd    V     0.85   1.05
";
