//! Testing utilities: a scripted [`CommandRunner`] that never touches a device.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use expo_dev_mcp_core::{Error, Result};

use crate::runner::CommandRunner;

/// Canned reaction to a command.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    /// Successful exit with this stdout
    Output(String),
    /// Non-zero exit with this message
    Failure(String),
    /// Command never finishes
    Timeout,
    /// Lines produced by a streaming command
    Lines(Vec<String>),
    /// Write these bytes to the path following `screenshot`, then succeed
    Screenshot(Vec<u8>),
}

/// Runner that answers commands from a prefix table and records every call.
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: Vec<(Vec<String>, FakeResponse)>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRunner {
    /// Create a runner with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any command starting with `prefix`. First match wins.
    pub fn on(mut self, prefix: &[&str], response: FakeResponse) -> Self {
        self.responses
            .push((prefix.iter().map(|s| s.to_string()).collect(), response));
        self
    }

    /// Answer `usbmux list` with the given JSON.
    pub fn with_devices(self, json: &str) -> Self {
        self.on(&["usbmux", "list"], FakeResponse::Output(json.to_string()))
    }

    /// Commands received so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn respond(&self, args: &[String]) -> Result<FakeResponse> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(args.to_vec());
        }
        self.responses
            .iter()
            .find(|(prefix, _)| args.starts_with(prefix))
            .map(|(_, response)| response.clone())
            .ok_or_else(|| Error::CommandFailed(format!("unexpected command: {}", args.join(" "))))
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn run(&self, args: &[String], timeout: Duration) -> Result<String> {
        match self.respond(args)? {
            FakeResponse::Output(out) => Ok(out),
            FakeResponse::Failure(msg) => Err(Error::CommandFailed(msg)),
            FakeResponse::Timeout => Err(Error::CommandTimeout(timeout.as_secs())),
            FakeResponse::Lines(lines) => Ok(lines.join("\n")),
            FakeResponse::Screenshot(bytes) => {
                let path = args
                    .iter()
                    .position(|a| a == "screenshot")
                    .and_then(|i| args.get(i + 1))
                    .ok_or_else(|| Error::InvalidInput("screenshot path missing".to_string()))?;
                std::fs::write(path, bytes)?;
                Ok(String::new())
            }
        }
    }

    async fn capture_lines(&self, args: &[String], _duration: Duration) -> Result<Vec<String>> {
        match self.respond(args)? {
            FakeResponse::Lines(lines) => Ok(lines),
            FakeResponse::Output(out) => Ok(out.lines().map(str::to_string).collect()),
            FakeResponse::Failure(msg) => Err(Error::CommandFailed(msg)),
            FakeResponse::Timeout => Ok(Vec::new()),
            FakeResponse::Screenshot(_) => Err(Error::InvalidInput(
                "screenshot response used for a stream".to_string(),
            )),
        }
    }
}

/// `usbmux list` output with two USB devices.
pub const TWO_DEVICES_JSON: &str = r#"[
  {
    "BuildVersion": "21F90",
    "ConnectionType": "USB",
    "DeviceClass": "iPhone",
    "DeviceName": "Dev iPhone",
    "Identifier": "00008110-0001",
    "ProductType": "iPhone14,5",
    "ProductVersion": "17.5.1",
    "UniqueDeviceID": "00008110-0001"
  },
  {
    "BuildVersion": "20H19",
    "ConnectionType": "Network",
    "DeviceClass": "iPad",
    "DeviceName": "Test iPad",
    "Identifier": "00008027-0002",
    "ProductType": "iPad8,9",
    "ProductVersion": "16.7",
    "UniqueDeviceID": "00008027-0002"
  }
]"#;
