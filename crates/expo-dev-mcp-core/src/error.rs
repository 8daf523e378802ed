//! Error types for the Expo Dev MCP Server.

use thiserror::Error;

/// Main error type for device operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No device is connected at all
    #[error("No device found. Connect an iOS device and try again.")]
    NoDevice,

    /// A device was requested by UDID or name but is not connected
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The backend command exited with a failure status
    #[error("{0}")]
    CommandFailed(String),

    /// The backend command did not finish in time
    #[error("Command timed out after {0} seconds")]
    CommandTimeout(u64),

    /// The backend executable could not be started
    #[error("{0} not found. Install with: pip install pymobiledevice3")]
    BackendNotFound(String),

    /// DVT command failed because the tunnel daemon is not reachable
    #[error("Tunnel daemon unavailable: {0}")]
    TunnelDaemonUnavailable(String),

    /// Screenshot command succeeded but produced no image
    #[error("Screenshot file was not created")]
    ScreenshotMissing,

    /// Backend output could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid input or parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Remediation hint shown to the user next to the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::NoDevice | Error::DeviceNotFound(_) => Some(
                "Make sure:\n1. Your device is connected via USB\n\
                 2. You've trusted the computer on your device\n\
                 3. pymobiledevice3 is installed: pip install pymobiledevice3",
            ),
            Error::TunnelDaemonUnavailable(_) => Some(
                "iOS 17+ devices need the tunnel daemon running: \
                 sudo python3 -m pymobiledevice3 remote tunneld",
            ),
            Error::ScreenshotMissing => {
                Some("Screenshots require Developer Mode to be enabled on iOS 16+ devices.")
            }
            _ => None,
        }
    }

    /// Error message followed by its hint, if any.
    pub fn with_hint(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{self}\n\n{hint}"),
            None => self.to_string(),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_device_error() {
        let err = Error::NoDevice;
        assert_eq!(
            err.to_string(),
            "No device found. Connect an iOS device and try again."
        );
    }

    #[test]
    fn test_device_not_found_error() {
        let err = Error::DeviceNotFound("Bob's iPhone".to_string());
        assert_eq!(err.to_string(), "Device not found: Bob's iPhone");
    }

    #[test]
    fn test_command_failed_is_passthrough() {
        let err = Error::CommandFailed("ERROR: device locked".to_string());
        assert_eq!(err.to_string(), "ERROR: device locked");
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_command_timeout_error() {
        let err = Error::CommandTimeout(30);
        assert_eq!(err.to_string(), "Command timed out after 30 seconds");
    }

    #[test]
    fn test_backend_not_found_error() {
        let err = Error::BackendNotFound("python3".to_string());
        assert_eq!(
            err.to_string(),
            "python3 not found. Install with: pip install pymobiledevice3"
        );
    }

    #[test]
    fn test_tunnel_hint() {
        let err = Error::TunnelDaemonUnavailable("Unable to connect to Tunneld".to_string());
        let text = err.with_hint();
        assert!(text.starts_with("Tunnel daemon unavailable: Unable to connect to Tunneld"));
        assert!(text.contains("remote tunneld"));
    }

    #[test]
    fn test_no_device_hint() {
        let text = Error::NoDevice.with_hint();
        assert!(text.contains("trusted the computer"));
    }

    #[test]
    fn test_with_hint_without_hint() {
        let err = Error::Parse("expected value".to_string());
        assert_eq!(err.with_hint(), "Parse error: expected value");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_error_debug() {
        let err = Error::InvalidInput("test".to_string());
        let debug_str = format!("{err:?}");
        assert!(debug_str.contains("InvalidInput"));
    }
}
