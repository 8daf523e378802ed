//! Integration tests for device operations.

use std::sync::Arc;

use expo_dev_mcp_core::ServerConfig;
use expo_dev_mcp_device::testing::{FakeResponse, FakeRunner, TWO_DEVICES_JSON};
use expo_dev_mcp_device::{format, DeviceClient};

#[tokio::test]
async fn test_list_then_format() {
    let runner = Arc::new(FakeRunner::new().with_devices(TWO_DEVICES_JSON));
    let client = DeviceClient::new(runner, &ServerConfig::default());

    let devices = client.list_devices().await.unwrap();
    let text = format::device_list(&devices);

    assert!(text.starts_with("Found 2 connected device(s):"));
    assert!(text.contains("2. Test iPad"));
    assert!(text.contains("Connection: Network"));
}

#[tokio::test]
async fn test_log_capture_end_to_end() {
    let lines: Vec<String> = (0..120).map(|i| format!("ExpoApp line {i}")).collect();
    let runner = Arc::new(
        FakeRunner::new()
            .with_devices(TWO_DEVICES_JSON)
            .on(&["syslog", "live"], FakeResponse::Lines(lines)),
    );
    let client = DeviceClient::new(runner, &ServerConfig::default());

    let capture = client
        .capture_logs(Some("Dev iPhone"), None, Some("expoapp"))
        .await
        .unwrap();
    let text = format::log_capture(&capture);

    assert_eq!(capture.duration_secs, 5);
    assert!(text.starts_with("Showing last 100 of 120 log lines:"));
    assert!(text.ends_with("ExpoApp line 119"));
}

#[tokio::test]
#[ignore = "Requires a connected iOS device and pymobiledevice3 (run locally with --ignored)"]
async fn test_real_device_listing() {
    let client = DeviceClient::from_config(&ServerConfig::default());

    match client.list_devices().await {
        Ok(devices) => {
            println!("{}", format::device_list(&devices));
            for device in devices {
                assert!(device.udid.is_some());
            }
        }
        Err(e) => println!("Backend unavailable: {}", e.with_hint()),
    }
}
