//! Device operations built on top of a [`CommandRunner`].

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use expo_dev_mcp_core::{
    AppEntry, DeviceInfo, DeviceSettings, DeviceSummary, Error, LogCapture, LogSettings, Result,
    ServerConfig,
};

use crate::runner::{CommandRunner, Pymobiledevice3};

/// Client for a set of connected iOS devices.
#[derive(Clone)]
pub struct DeviceClient {
    runner: Arc<dyn CommandRunner>,
    device: DeviceSettings,
    logs: LogSettings,
}

impl DeviceClient {
    /// Create a client with an explicit runner.
    pub fn new(runner: Arc<dyn CommandRunner>, config: &ServerConfig) -> Self {
        Self {
            runner,
            device: config.device.clone(),
            logs: config.logs.clone(),
        }
    }

    /// Create a client backed by the pymobiledevice3 CLI.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(Pymobiledevice3::new(config.device.clone())),
            config,
        )
    }

    /// Log capture settings in effect.
    pub fn log_settings(&self) -> &LogSettings {
        &self.logs
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.device.command_timeout_secs)
    }

    fn slow_timeout(&self) -> Duration {
        Duration::from_secs(self.device.slow_command_timeout_secs)
    }

    /// `--udid U`, or `--tunnel U` when DVT goes through the tunnel daemon.
    fn dvt_target(&self, udid: &str) -> [String; 2] {
        let flag = if self.device.use_tunnel {
            "--tunnel"
        } else {
            "--udid"
        };
        [flag.to_string(), udid.to_string()]
    }

    async fn run(&self, args: Vec<String>, timeout: Duration) -> Result<String> {
        self.runner.run(&args, timeout).await
    }

    async fn run_dvt(&self, args: Vec<String>, timeout: Duration) -> Result<String> {
        self.run(args, timeout).await.map_err(|err| match err {
            Error::CommandFailed(msg) if msg.to_lowercase().contains("tunneld") => {
                Error::TunnelDaemonUnavailable(msg)
            }
            other => other,
        })
    }

    /// List connected devices.
    ///
    /// Output that is not a JSON array is treated as "no devices".
    pub async fn list_devices(&self) -> Result<Vec<DeviceSummary>> {
        let output = self
            .run(args(&["usbmux", "list", "--no-color", "-o", "json"]), self.timeout())
            .await?;

        match serde_json::from_str::<Vec<DeviceSummary>>(&output) {
            Ok(devices) => {
                debug!("{} found {} device(s)", self.runner.name(), devices.len());
                Ok(devices)
            }
            Err(e) => {
                warn!("Unexpected usbmux output ({}): {}", e, output.trim());
                Ok(Vec::new())
            }
        }
    }

    /// Resolve a UDID or device name to a UDID; `None` picks the first device.
    pub async fn resolve_udid(&self, device_id: Option<&str>) -> Result<String> {
        let devices = self.list_devices().await?;
        if devices.is_empty() {
            return Err(Error::NoDevice);
        }

        let device = match device_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => devices
                .iter()
                .find(|d| d.matches(id))
                .ok_or_else(|| Error::DeviceNotFound(id.to_string()))?,
            None => &devices[0],
        };

        device.udid.clone().ok_or(Error::NoDevice)
    }

    /// Lockdown values for a device.
    pub async fn device_info(&self, device_id: Option<&str>) -> Result<DeviceInfo> {
        let udid = self.resolve_udid(device_id).await?;
        let output = self
            .run(
                args(&["lockdown", "info", "--udid", &udid, "-o", "json"]),
                self.timeout(),
            )
            .await?;

        match serde_json::from_str::<Value>(&output)? {
            Value::Object(values) => Ok(DeviceInfo::new(values)),
            other => Err(Error::Parse(format!(
                "expected a JSON object from lockdown info, got {other}"
            ))),
        }
    }

    /// Capture the screen as PNG bytes.
    pub async fn screenshot(&self, device_id: Option<&str>) -> Result<Vec<u8>> {
        let udid = self.resolve_udid(device_id).await?;

        // Removed when `file` drops, on every path out of this function.
        let file = tempfile::Builder::new()
            .prefix("expo-dev-mcp-")
            .suffix(".png")
            .tempfile()?;
        let path = file.path().to_string_lossy().into_owned();

        let mut command = args(&["developer", "dvt", "screenshot", &path]);
        command.extend(self.dvt_target(&udid));
        self.run_dvt(command, self.slow_timeout()).await?;

        let data = match tokio::fs::read(file.path()).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ScreenshotMissing)
            }
            Err(e) => return Err(e.into()),
        };
        if data.is_empty() {
            return Err(Error::ScreenshotMissing);
        }

        info!("Screenshot captured: {} bytes from {}", data.len(), udid);
        Ok(data)
    }

    /// Installed applications sorted by bundle id, optionally filtered.
    pub async fn list_apps(
        &self,
        device_id: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Vec<AppEntry>> {
        let udid = self.resolve_udid(device_id).await?;
        let output = self
            .run(
                args(&["apps", "list", "--udid", &udid, "-o", "json"]),
                self.slow_timeout(),
            )
            .await?;

        let apps = match serde_json::from_str::<Value>(&output)? {
            Value::Object(apps) => apps,
            other => {
                return Err(Error::Parse(format!(
                    "expected a JSON object from apps list, got {other}"
                )))
            }
        };

        let filter = filter.map(str::trim).filter(|f| !f.is_empty());
        let mut entries: Vec<AppEntry> = apps
            .iter()
            .map(|(bundle_id, plist)| AppEntry::from_plist(bundle_id, plist))
            .filter(|app| filter.map_or(true, |f| app.matches(f)))
            .collect();
        entries.sort_by(|a, b| a.bundle_id.cmp(&b.bundle_id));

        Ok(entries)
    }

    /// Launch an app. Returns whatever the backend printed.
    pub async fn launch_app(&self, bundle_id: &str, device_id: Option<&str>) -> Result<String> {
        self.dvt_app_command("launch", bundle_id, device_id).await
    }

    /// Force quit an app. Returns whatever the backend printed.
    pub async fn kill_app(&self, bundle_id: &str, device_id: Option<&str>) -> Result<String> {
        self.dvt_app_command("kill", bundle_id, device_id).await
    }

    async fn dvt_app_command(
        &self,
        action: &str,
        bundle_id: &str,
        device_id: Option<&str>,
    ) -> Result<String> {
        let bundle_id = bundle_id.trim();
        if bundle_id.is_empty() {
            return Err(Error::InvalidInput("bundle_id cannot be empty".to_string()));
        }

        let udid = self.resolve_udid(device_id).await?;
        let mut command = args(&["developer", "dvt", action, bundle_id]);
        command.extend(self.dvt_target(&udid));

        let output = self.run_dvt(command, self.timeout()).await?;
        info!("dvt {} {} on {}", action, bundle_id, udid);
        Ok(output.trim().to_string())
    }

    /// Stream the device syslog for a clamped duration.
    pub async fn capture_logs(
        &self,
        device_id: Option<&str>,
        duration_secs: Option<i64>,
        filter: Option<&str>,
    ) -> Result<LogCapture> {
        let udid = self.resolve_udid(device_id).await?;
        let duration_secs = self.logs.clamp_duration(duration_secs);

        let raw = self
            .runner
            .capture_lines(
                &args(&["syslog", "live", "--udid", &udid, "--no-color"]),
                Duration::from_secs(duration_secs),
            )
            .await?;

        debug!("Captured {} raw syslog lines", raw.len());
        Ok(collect_log_lines(
            raw,
            filter,
            self.logs.max_lines,
            duration_secs,
        ))
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Filter, trim and keep the trailing `max_lines` lines.
///
/// Blank lines are kept and counted like any other syslog line.
pub(crate) fn collect_log_lines(
    raw: Vec<String>,
    filter: Option<&str>,
    max_lines: usize,
    duration_secs: u64,
) -> LogCapture {
    let filter = filter.filter(|f| !f.is_empty());
    let needle = filter.map(str::to_lowercase);

    let mut lines: Vec<String> = raw
        .into_iter()
        .filter(|line| {
            needle
                .as_deref()
                .map_or(true, |n| line.to_lowercase().contains(n))
        })
        .map(|line| line.trim_end().to_string())
        .collect();

    let total = lines.len();
    if total > max_lines {
        lines.drain(..total - max_lines);
    }

    LogCapture {
        lines,
        total,
        duration_secs,
        filter: filter.map(str::to_string),
    }
}
