//! # expo-dev-mcp-core
//!
//! Core types for the Expo Dev MCP Server.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other expo-dev-mcp crates. It provides:
//!
//! - Error types
//! - YAML configuration (server, device backend, log capture)
//! - Bearer token for the HTTP transport
//! - Device, app and log records parsed from pymobiledevice3 output
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other expo-dev-mcp crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod device;
pub mod error;
pub mod token;

// Re-export commonly used types
pub use config::{DeviceSettings, LogSettings, ServerConfig, ServerSettings, Transport};
pub use device::{AppEntry, DeviceInfo, DeviceSummary, LogCapture};
pub use error::{Error, Result};
pub use token::AuthToken;
