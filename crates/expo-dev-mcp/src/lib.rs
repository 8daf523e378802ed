//! Expo Dev MCP Server Library
//!
//! This library contains the MCP protocol layer, tool parameter types and
//! the HTTP transport. The actual server binary is in main.rs.

pub mod banner;
pub mod http;
pub mod protocol;
pub mod tools;

// Re-export commonly used types
pub use protocol::{ExpoDevMcpServer, SERVER_NAME};
pub use tools::*;
