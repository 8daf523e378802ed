//! MCP Tool Parameter Types
//!
//! Parameter structs for every tool exposed by the server. The doc comments
//! on fields become the descriptions in the generated JSON schemas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// =============================================================================
// Discovery Tools
// =============================================================================

/// Parameters for list_devices
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListDevicesParams {}

/// Parameters for tools that only target a device
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeviceParams {
    /// Device UDID or name. If not provided, uses the first connected device.
    #[serde(default)]
    pub device_id: Option<String>,
}

// =============================================================================
// Log Tools
// =============================================================================

/// Parameters for get_logs
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetLogsParams {
    /// Device UDID or name. If not provided, uses the first connected device.
    #[serde(default)]
    pub device_id: Option<String>,

    /// How many seconds of logs to capture. Default is 5 seconds, clamped to 1-30.
    #[serde(default)]
    pub duration_seconds: Option<i64>,

    /// Optional text filter to only show logs containing this string (case-insensitive).
    #[serde(default)]
    pub filter: Option<String>,
}

// =============================================================================
// App Tools
// =============================================================================

/// Parameters for list_apps
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListAppsParams {
    /// Device UDID or name. If not provided, uses the first connected device.
    #[serde(default)]
    pub device_id: Option<String>,

    /// Optional filter to search for specific apps by name or bundle ID.
    #[serde(default)]
    pub filter: Option<String>,
}

/// Parameters for launch_app and kill_app
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AppParams {
    /// The bundle identifier of the app (e.g., 'com.example.myapp').
    pub bundle_id: String,

    /// Device UDID or name. If not provided, uses the first connected device.
    #[serde(default)]
    pub device_id: Option<String>,
}
