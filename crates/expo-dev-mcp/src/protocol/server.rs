//! Expo Dev MCP Server Implementation
//!
//! This module implements the MCP server using rmcp 0.9's #[tool_router] pattern.
//! Each tool is a short forwarding call into [`DeviceClient`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use tracing::{debug, info, instrument, warn};

use expo_dev_mcp_core::{Error, ServerConfig};
use expo_dev_mcp_device::{format, DeviceClient};

use crate::tools::*;

/// Server name reported to clients and the health endpoint.
pub const SERVER_NAME: &str = "expo-dev-mcp";

/// Render a device failure as a tool error result.
///
/// Device lookup failures stand on their own; everything else is prefixed
/// with the action that failed.
fn failure(action: &str, err: &Error) -> CallToolResult {
    warn!("Failed to {}: {}", action, err);
    let text = match err {
        Error::NoDevice | Error::DeviceNotFound(_) => err.with_hint(),
        _ => format!("Failed to {action}: {}", err.with_hint()),
    };
    CallToolResult::error(vec![Content::text(text)])
}

fn invalid_params(err: &Error) -> McpError {
    McpError::new(ErrorCode(-32602), err.to_string(), None)
}

/// Expo Dev MCP Server
///
/// Exposes connected iOS devices via MCP tools.
#[derive(Clone)]
pub struct ExpoDevMcpServer {
    /// Device operations (pymobiledevice3 backed)
    client: DeviceClient,
    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ExpoDevMcpServer {
    /// Create a server backed by pymobiledevice3 with the given configuration
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_client(DeviceClient::from_config(config))
    }

    /// Create a server around an existing device client
    pub fn with_client(client: DeviceClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// List connected devices
    #[tool(
        description = "List all connected iOS devices. Returns device names, UDIDs, and connection info."
    )]
    #[instrument(skip_all)]
    async fn list_devices(
        &self,
        Parameters(_params): Parameters<ListDevicesParams>,
    ) -> Result<CallToolResult, McpError> {
        debug!("Listing connected devices");

        match self.client.list_devices().await {
            Ok(devices) => {
                info!("Found {} device(s)", devices.len());
                Ok(CallToolResult::success(vec![Content::text(
                    format::device_list(&devices),
                )]))
            }
            Err(e) => Ok(failure("list devices", &e)),
        }
    }

    /// Lockdown info summary
    #[tool(
        description = "Get detailed information about a connected iOS device including model, iOS version, battery, storage, etc."
    )]
    #[instrument(skip_all)]
    async fn device_info(
        &self,
        Parameters(params): Parameters<DeviceParams>,
    ) -> Result<CallToolResult, McpError> {
        debug!("Getting device info: device_id={:?}", params.device_id);

        match self.client.device_info(params.device_id.as_deref()).await {
            Ok(info) => Ok(CallToolResult::success(vec![Content::text(
                format::device_info(&info),
            )])),
            Err(e) => Ok(failure("get device info", &e)),
        }
    }

    /// Capture the screen as a PNG image
    #[tool(
        description = "Take a screenshot of the iOS device screen. Returns the image that can be viewed directly."
    )]
    #[instrument(skip_all)]
    async fn screenshot(
        &self,
        Parameters(params): Parameters<DeviceParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Taking screenshot: device_id={:?}", params.device_id);

        match self.client.screenshot(params.device_id.as_deref()).await {
            Ok(png) => Ok(CallToolResult::success(vec![
                Content::image(STANDARD.encode(&png), "image/png"),
                Content::text(format!(
                    "Screenshot captured at {}",
                    chrono::Local::now().format("%H:%M:%S")
                )),
            ])),
            Err(e) => Ok(failure("take screenshot", &e)),
        }
    }

    /// Capture a window of syslog output
    #[tool(
        description = "Get recent system logs from the iOS device. Useful for debugging app crashes and issues."
    )]
    #[instrument(skip_all)]
    async fn get_logs(
        &self,
        Parameters(params): Parameters<GetLogsParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            "Capturing logs: device_id={:?}, duration_seconds={:?}, filter={:?}",
            params.device_id, params.duration_seconds, params.filter
        );

        match self
            .client
            .capture_logs(
                params.device_id.as_deref(),
                params.duration_seconds,
                params.filter.as_deref(),
            )
            .await
        {
            Ok(capture) => {
                info!(
                    "Captured {} log lines ({} kept)",
                    capture.total,
                    capture.lines.len()
                );
                Ok(CallToolResult::success(vec![Content::text(
                    format::log_capture(&capture),
                )]))
            }
            Err(e) => Ok(failure("capture logs", &e)),
        }
    }

    /// List installed apps
    #[tool(description = "List all installed applications on the iOS device.")]
    #[instrument(skip_all)]
    async fn list_apps(
        &self,
        Parameters(params): Parameters<ListAppsParams>,
    ) -> Result<CallToolResult, McpError> {
        debug!(
            "Listing apps: device_id={:?}, filter={:?}",
            params.device_id, params.filter
        );

        match self
            .client
            .list_apps(params.device_id.as_deref(), params.filter.as_deref())
            .await
        {
            Ok(apps) => Ok(CallToolResult::success(vec![Content::text(
                format::app_list(&apps, params.filter.as_deref()),
            )])),
            Err(e) => Ok(failure("list apps", &e)),
        }
    }

    /// Launch an app by bundle id
    #[tool(description = "Launch an application on the iOS device by its bundle ID.")]
    #[instrument(skip_all)]
    async fn launch_app(
        &self,
        Parameters(params): Parameters<AppParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            "Launching app: bundle_id='{}', device_id={:?}",
            params.bundle_id, params.device_id
        );

        match self
            .client
            .launch_app(&params.bundle_id, params.device_id.as_deref())
            .await
        {
            Ok(output) => {
                let mut text = format!("Launched {}", params.bundle_id.trim());
                if !output.is_empty() {
                    text.push('\n');
                    text.push_str(&output);
                }
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e @ Error::InvalidInput(_)) => Err(invalid_params(&e)),
            Err(e @ Error::CommandFailed(_)) => {
                let mut result = failure(&format!("launch {}", params.bundle_id.trim()), &e);
                result.content.push(Content::text(
                    "Make sure the app is installed and Developer Mode is enabled.",
                ));
                Ok(result)
            }
            Err(e) => Ok(failure(&format!("launch {}", params.bundle_id.trim()), &e)),
        }
    }

    /// Force quit an app by bundle id
    #[tool(description = "Force quit an application on the iOS device.")]
    #[instrument(skip_all)]
    async fn kill_app(
        &self,
        Parameters(params): Parameters<AppParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            "Killing app: bundle_id='{}', device_id={:?}",
            params.bundle_id, params.device_id
        );

        match self
            .client
            .kill_app(&params.bundle_id, params.device_id.as_deref())
            .await
        {
            Ok(_) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Killed {}",
                params.bundle_id.trim()
            ))])),
            Err(e @ Error::InvalidInput(_)) => Err(invalid_params(&e)),
            Err(e) => Ok(failure(&format!("kill {}", params.bundle_id.trim()), &e)),
        }
    }
}

// Implement the ServerHandler trait to define server capabilities
#[tool_handler]
impl rmcp::ServerHandler for ExpoDevMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Expo Dev MCP Server - Inspect and control iOS devices running Expo development builds. \
                 Use list_devices to find connected devices, screenshot to see the screen, \
                 get_logs to read recent syslog output, and list_apps / launch_app / kill_app \
                 to manage applications. device_id is optional and defaults to the first device."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}
