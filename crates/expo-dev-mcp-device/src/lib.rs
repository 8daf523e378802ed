//! # expo-dev-mcp-device
//!
//! Device operations for the Expo Dev MCP Server.
//!
//! Every capability is a call to the `pymobiledevice3` command-line tool:
//! - Device discovery (`usbmux list`) and UDID resolution
//! - Lockdown info, installed apps
//! - DVT screenshot, launch and kill
//! - Syslog capture for a bounded duration
//!
//! ## Architecture
//!
//! This is Layer 1 - it depends on expo-dev-mcp-core only. The
//! [`CommandRunner`] trait is the seam between device logic and process
//! execution; tests swap in [`testing::FakeRunner`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod format;
pub mod runner;
pub mod testing;

// Re-export commonly used types
pub use client::DeviceClient;
pub use runner::{CommandRunner, Pymobiledevice3};
