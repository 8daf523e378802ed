//! Records parsed from pymobiledevice3 JSON output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of `usbmux list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Device UDID
    #[serde(rename = "UniqueDeviceID", default)]
    pub udid: Option<String>,

    /// User-visible device name
    #[serde(rename = "DeviceName", default)]
    pub name: Option<String>,

    /// USB or Network
    #[serde(rename = "ConnectionType", default)]
    pub connection_type: Option<String>,

    /// Hardware identifier, e.g. iPhone15,2
    #[serde(rename = "ProductType", default)]
    pub product_type: Option<String>,

    /// iOS version
    #[serde(rename = "ProductVersion", default)]
    pub product_version: Option<String>,
}

impl DeviceSummary {
    /// Whether `id` names this device by UDID or by device name.
    pub fn matches(&self, id: &str) -> bool {
        self.udid.as_deref() == Some(id) || self.name.as_deref() == Some(id)
    }
}

/// Lockdown values as returned by `lockdown info`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceInfo {
    values: Map<String, Value>,
}

impl DeviceInfo {
    /// Wrap a lockdown value map.
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Raw value for a lockdown key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Value rendered for display; strings are unquoted.
    pub fn display(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// Display value or a fallback when the key is missing.
    pub fn display_or(&self, key: &str, fallback: &str) -> String {
        self.display(key).unwrap_or_else(|| fallback.to_string())
    }
}

/// An installed application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    /// CFBundleIdentifier
    pub bundle_id: String,
    /// Display name, falling back to the bundle name, then the bundle id
    pub name: String,
    /// CFBundleShortVersionString
    pub version: Option<String>,
}

impl AppEntry {
    /// Build an entry from the bundle id and its Info.plist values.
    pub fn from_plist(bundle_id: &str, plist: &Value) -> Self {
        let string_field = |key: &str| {
            plist
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let name = string_field("CFBundleDisplayName")
            .or_else(|| string_field("CFBundleName"))
            .unwrap_or_else(|| bundle_id.to_string());

        Self {
            bundle_id: bundle_id.to_string(),
            name,
            version: string_field("CFBundleShortVersionString"),
        }
    }

    /// Case-insensitive match against name and bundle id.
    pub fn matches(&self, filter: &str) -> bool {
        let haystack = format!("{} {}", self.name, self.bundle_id).to_lowercase();
        haystack.contains(&filter.to_lowercase())
    }
}

/// Result of a syslog capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCapture {
    /// Trailing lines kept after truncation
    pub lines: Vec<String>,
    /// Number of matching lines before truncation
    pub total: usize,
    /// Effective capture duration in seconds
    pub duration_secs: u64,
    /// Filter that was applied
    pub filter: Option<String>,
}

impl LogCapture {
    /// Whether older lines were dropped.
    pub fn truncated(&self) -> bool {
        self.total > self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_summary_from_usbmux_json() {
        let raw = json!({
            "BuildVersion": "21F90",
            "ConnectionType": "USB",
            "DeviceClass": "iPhone",
            "DeviceName": "Test iPhone",
            "Identifier": "00008110-000A",
            "ProductType": "iPhone14,5",
            "ProductVersion": "17.5.1",
            "UniqueDeviceID": "00008110-000A"
        });
        let device: DeviceSummary = serde_json::from_value(raw).unwrap();
        assert_eq!(device.udid.as_deref(), Some("00008110-000A"));
        assert_eq!(device.name.as_deref(), Some("Test iPhone"));
        assert_eq!(device.connection_type.as_deref(), Some("USB"));
        assert!(device.matches("Test iPhone"));
        assert!(device.matches("00008110-000A"));
        assert!(!device.matches("Other"));
    }

    #[test]
    fn test_device_summary_missing_fields() {
        let device: DeviceSummary = serde_json::from_value(json!({})).unwrap();
        assert_eq!(device, DeviceSummary::default());
    }

    #[test]
    fn test_device_info_display() {
        let info = DeviceInfo::new(
            json!({
                "DeviceName": "Test iPhone",
                "Supports5GStandalone": true,
                "BatteryCurrentCapacity": 87
            })
            .as_object()
            .cloned()
            .unwrap(),
        );
        assert_eq!(info.display("DeviceName").as_deref(), Some("Test iPhone"));
        assert_eq!(info.display("Supports5GStandalone").as_deref(), Some("true"));
        assert_eq!(info.display("BatteryCurrentCapacity").as_deref(), Some("87"));
        assert_eq!(info.display_or("SerialNumber", "Unknown"), "Unknown");
        assert!(info.contains("BatteryCurrentCapacity"));
    }

    #[test]
    fn test_app_entry_name_fallbacks() {
        let app = AppEntry::from_plist(
            "com.example.a",
            &json!({"CFBundleDisplayName": "Alpha", "CFBundleName": "A"}),
        );
        assert_eq!(app.name, "Alpha");

        let app = AppEntry::from_plist("com.example.b", &json!({"CFBundleName": "Beta"}));
        assert_eq!(app.name, "Beta");

        let app = AppEntry::from_plist("com.example.c", &json!({"CFBundleDisplayName": ""}));
        assert_eq!(app.name, "com.example.c");
        assert_eq!(app.version, None);
    }

    #[test]
    fn test_app_entry_filter() {
        let app = AppEntry::from_plist(
            "host.exp.Exponent",
            &json!({"CFBundleDisplayName": "Expo Go", "CFBundleShortVersionString": "2.31.2"}),
        );
        assert!(app.matches("expo go"));
        assert!(app.matches("EXPONENT"));
        assert!(!app.matches("safari"));
        assert_eq!(app.version.as_deref(), Some("2.31.2"));
    }

    #[test]
    fn test_log_capture_truncated() {
        let capture = LogCapture {
            lines: vec!["a".to_string()],
            total: 3,
            duration_secs: 5,
            filter: None,
        };
        assert!(capture.truncated());
    }
}
