//! Plain-text rendering of device results for tool responses.

use expo_dev_mcp_core::{AppEntry, DeviceInfo, DeviceSummary, LogCapture};

const UNKNOWN: &str = "Unknown";

/// Numbered device list, or setup help when nothing is connected.
pub fn device_list(devices: &[DeviceSummary]) -> String {
    if devices.is_empty() {
        return "No iOS devices connected.\n\n\
                Make sure:\n\
                1. Your device is connected via USB\n\
                2. You've trusted the computer on your device\n\
                3. pymobiledevice3 is installed: pip install pymobiledevice3"
            .to_string();
    }

    let mut lines = vec![format!("Found {} connected device(s):\n", devices.len())];
    for (i, device) in devices.iter().enumerate() {
        lines.push(format!(
            "{}. {}",
            i + 1,
            device.name.as_deref().unwrap_or(UNKNOWN)
        ));
        lines.push(format!(
            "   UDID: {}",
            device.udid.as_deref().unwrap_or(UNKNOWN)
        ));
        lines.push(format!(
            "   Connection: {}",
            device.connection_type.as_deref().unwrap_or(UNKNOWN)
        ));
        if let (Some(product), Some(version)) = (&device.product_type, &device.product_version) {
            lines.push(format!("   Model: {product} (iOS {version})"));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Summary of the interesting lockdown values.
pub fn device_info(info: &DeviceInfo) -> String {
    let mut lines = vec![
        format!("Device: {}", info.display_or("DeviceName", UNKNOWN)),
        format!(
            "Model: {} ({})",
            info.display_or("ProductType", UNKNOWN),
            info.display_or("HardwareModel", "")
        ),
        format!(
            "iOS Version: {} (Build {})",
            info.display_or("ProductVersion", UNKNOWN),
            info.display_or("BuildVersion", "")
        ),
        format!("UDID: {}", info.display_or("UniqueDeviceID", UNKNOWN)),
        format!("Serial: {}", info.display_or("SerialNumber", UNKNOWN)),
        format!("WiFi MAC: {}", info.display_or("WiFiAddress", UNKNOWN)),
        format!(
            "Bluetooth MAC: {}",
            info.display_or("BluetoothAddress", UNKNOWN)
        ),
        String::new(),
        format!("Device Class: {}", info.display_or("DeviceClass", UNKNOWN)),
        format!("CPU: {}", info.display_or("CPUArchitecture", UNKNOWN)),
        format!(
            "Supports 5G: {}",
            info.display_or("Supports5GStandalone", UNKNOWN)
        ),
    ];

    if info.contains("BatteryCurrentCapacity") {
        lines.push(format!(
            "Battery: {}%",
            info.display_or("BatteryCurrentCapacity", "?")
        ));
    }

    lines.join("\n")
}

/// Bulleted app list with a count header.
pub fn app_list(apps: &[AppEntry], filter: Option<&str>) -> String {
    let filter = filter.map(str::trim).filter(|f| !f.is_empty());

    if apps.is_empty() {
        return match filter {
            Some(f) => format!("No apps found matching '{f}'."),
            None => "No apps found.".to_string(),
        };
    }

    let mut header = format!("Found {} app(s)", apps.len());
    if let Some(f) = filter {
        header.push_str(&format!(" matching '{f}'"));
    }
    header.push_str(":\n\n");

    let mut lines = Vec::with_capacity(apps.len() * 4);
    for app in apps {
        lines.push(format!("• {}", app.name));
        lines.push(format!("  Bundle ID: {}", app.bundle_id));
        if let Some(version) = &app.version {
            lines.push(format!("  Version: {version}"));
        }
        lines.push(String::new());
    }

    header + &lines.join("\n")
}

/// Captured syslog lines with a header describing truncation.
pub fn log_capture(capture: &LogCapture) -> String {
    if capture.lines.is_empty() {
        let mut msg = format!("No logs captured in {} seconds.", capture.duration_secs);
        if let Some(f) = &capture.filter {
            msg.push_str(&format!(" (filter: '{f}')"));
        }
        return msg;
    }

    let header = if capture.truncated() {
        format!(
            "Showing last {} of {} log lines:\n\n",
            capture.lines.len(),
            capture.total
        )
    } else {
        format!("Captured {} log lines:\n\n", capture.total)
    };

    header + &capture.lines.join("\n")
}
