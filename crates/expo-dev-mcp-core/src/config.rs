//! Configuration types for Expo Dev MCP Server.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Server configuration loaded from YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Server settings
    pub server: ServerSettings,
    /// Device backend settings
    pub device: DeviceSettings,
    /// Log capture settings
    pub logs: LogSettings,
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ServerConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        Transport::parse(&self.server.transport)?;

        if self.server.port == 0 {
            return Err(Error::Config("server.port must be > 0".to_string()));
        }

        if self.device.program.trim().is_empty() {
            return Err(Error::Config("device.program cannot be empty".to_string()));
        }

        if self.device.command_timeout_secs == 0 || self.device.slow_command_timeout_secs == 0 {
            return Err(Error::Config("device timeouts must be > 0".to_string()));
        }

        self.logs.validate()
    }
}

/// MCP transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout
    Stdio,
    /// Streamable HTTP with bearer auth
    Http,
}

impl Transport {
    /// Parse a transport name as used in the config file.
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(Error::Config(format!(
                "unknown transport '{other}' (expected stdio or http)"
            ))),
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http => write!(f, "http"),
        }
    }
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Transport type (stdio or http)
    pub transport: String,
    /// Bind address for HTTP mode
    pub host: String,
    /// Port for HTTP mode
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: "stdio".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
        }
    }
}

impl ServerSettings {
    /// Parsed transport. Only valid after [`ServerConfig::validate`].
    pub fn transport(&self) -> Result<Transport> {
        Transport::parse(&self.transport)
    }
}

/// Settings for the pymobiledevice3 backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Interpreter or executable to run
    pub program: String,
    /// Arguments placed before every backend command
    pub module_args: Vec<String>,
    /// Timeout for regular commands in seconds
    pub command_timeout_secs: u64,
    /// Timeout for screenshot and app listing in seconds
    pub slow_command_timeout_secs: u64,
    /// Address DVT commands through the tunnel daemon (iOS 17+)
    pub use_tunnel: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            module_args: vec!["-m".to_string(), "pymobiledevice3".to_string()],
            command_timeout_secs: 30,
            slow_command_timeout_secs: 60,
            use_tunnel: false,
        }
    }
}

/// Log capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Capture duration when the caller gives none
    pub default_duration_secs: u64,
    /// Lower clamp for requested durations
    pub min_duration_secs: u64,
    /// Upper clamp for requested durations
    pub max_duration_secs: u64,
    /// Number of trailing lines returned
    pub max_lines: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            default_duration_secs: 5,
            min_duration_secs: 1,
            max_duration_secs: 30,
            max_lines: 100,
        }
    }
}

impl LogSettings {
    /// Validate duration bounds and line limit.
    pub fn validate(&self) -> Result<()> {
        if self.min_duration_secs == 0 || self.min_duration_secs > self.max_duration_secs {
            return Err(Error::Config(
                "logs: require 0 < min_duration_secs <= max_duration_secs".to_string(),
            ));
        }
        if !(self.min_duration_secs..=self.max_duration_secs).contains(&self.default_duration_secs)
        {
            return Err(Error::Config(
                "logs.default_duration_secs must lie within the min/max bounds".to_string(),
            ));
        }
        if self.max_lines == 0 {
            return Err(Error::Config("logs.max_lines must be > 0".to_string()));
        }
        Ok(())
    }

    /// Clamp a requested duration (or the default) into the configured bounds.
    ///
    /// Negative requests count as zero and land on the minimum.
    pub fn clamp_duration(&self, requested: Option<i64>) -> u64 {
        let requested = requested.map_or(self.default_duration_secs, |secs| {
            u64::try_from(secs).unwrap_or(0)
        });
        requested
            .max(self.min_duration_secs)
            .min(self.max_duration_secs)
    }
}
