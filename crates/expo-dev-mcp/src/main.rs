//! # Expo Dev MCP Server
//!
//! Model Context Protocol server for AI agents to inspect and control iOS
//! devices running Expo development builds.
//!
//! ## Overview
//!
//! This server provides MCP tools for:
//! - Device discovery (list devices, device info)
//! - Screen capture (screenshot)
//! - Debugging (syslog capture)
//! - App lifecycle (list, launch, kill)
//!
//! ## Transports
//!
//! - stdio (default): for local MCP clients
//! - http (`--http`): streamable HTTP with bearer auth, for remote access via ngrok
//!
//! ## Architecture
//!
//! This is Layer 2 - the main MCP server binary that ties together:
//! - expo-dev-mcp-core: Errors, configuration, token
//! - expo-dev-mcp-device: pymobiledevice3-backed device operations

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};

use expo_dev_mcp::{banner, http, ExpoDevMcpServer};
use expo_dev_mcp_core::{AuthToken, ServerConfig, Transport};

#[derive(Parser, Debug)]
#[command(name = "expo-dev-mcp", version)]
#[command(about = "Expo Dev Build MCP Server")]
#[command(after_help = "Examples:
  # Run locally (stdio mode, default)
  expo-dev-mcp

  # Run in HTTP mode for remote access
  expo-dev-mcp --http --port 8080

  # Expose with ngrok and print client configuration
  scripts/start-tunnel.sh 8080")]
struct Args {
    /// Run in HTTP mode instead of stdio (for remote access via ngrok)
    #[arg(long)]
    http: bool,

    /// Port for HTTP server (default: 8080)
    #[arg(long)]
    port: Option<u16>,

    /// Bind address for HTTP server (default: 0.0.0.0)
    #[arg(long)]
    host: Option<String>,

    /// Auth token for HTTP mode (auto-generated if not provided)
    #[arg(long, env = "EXPO_DEV_MCP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// YAML configuration file
    #[arg(long, env = "EXPO_DEV_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Load the config file (if any) and apply command line overrides.
    fn resolve_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if self.http {
            config.server.transport = Transport::Http.to_string();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(level) = &self.log_level {
            config.server.log_level = level.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.resolve_config()?;

    // Initialize logging (stderr keeps stdout free for the stdio transport)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let transport = config.server.transport()?;
    tracing::info!(
        "Expo Dev MCP Server v{} starting with {} transport...",
        env!("CARGO_PKG_VERSION"),
        transport
    );

    let server = ExpoDevMcpServer::new(&config);

    match transport {
        Transport::Stdio => {
            tracing::info!("Server initialized, starting stdio transport...");

            // Serve the MCP server over stdio
            let service = server.serve(stdio()).await.map_err(|e| {
                tracing::error!("Error starting server: {}", e);
                e
            })?;

            tracing::info!("Expo Dev MCP Server running on stdio");

            // Wait for the service to complete
            service.waiting().await?;
        }
        Transport::Http => {
            let token = match &args.token {
                Some(value) => AuthToken::new(value.clone())?,
                None => AuthToken::generate(),
            };
            eprintln!(
                "{}",
                banner::startup_banner(&config.server.host, config.server.port, &token)
            );

            http::serve(server, token, &config.server.host, config.server.port)
                .await
                .with_context(|| {
                    format!(
                        "HTTP transport failed on {}:{}",
                        config.server.host, config.server.port
                    )
                })?;
        }
    }

    tracing::info!("Expo Dev MCP Server shutting down");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_stdio() {
        let args = Args::try_parse_from(["expo-dev-mcp"]).unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.server.transport().unwrap(), Transport::Stdio);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_http_flags_override() {
        let args = Args::try_parse_from([
            "expo-dev-mcp",
            "--http",
            "--port",
            "9123",
            "--host",
            "127.0.0.1",
            "--token",
            "secret",
        ])
        .unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.server.transport().unwrap(), Transport::Http);
        assert_eq!(config.server.port, 9123);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(args.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_port_zero_rejected() {
        let args = Args::try_parse_from(["expo-dev-mcp", "--http", "--port", "0"]).unwrap();
        assert!(args.resolve_config().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let args =
            Args::try_parse_from(["expo-dev-mcp", "--config", "/nonexistent/expo-dev-mcp.yaml"])
                .unwrap();
        assert!(args.resolve_config().is_err());
    }
}
