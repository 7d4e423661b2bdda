//! Read-only observation capability and the payloads it returns.
//!
//! None of these operations change device or app state. Selector-based
//! lookups resolve the first match in document order, except
//! [`DataGatheringTools::find_elements`], which returns every match. All
//! lookups honor the implicit wait configured at connect time.

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use screengraph_core::{
    AppInfo, Bounds, DeviceOrientation, PlatformInfo, ScreenSize, Selector, ToolResult,
};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A captured screen image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    /// Base64-encoded PNG image data.
    pub data_base64: String,
    /// Pixel dimensions read from the PNG header, when it is a PNG.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub captured_at: DateTime<Utc>,
}

impl Screenshot {
    pub fn from_base64(data_base64: String) -> Self {
        let (width, height) = match png_dimensions(&data_base64) {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };
        Self {
            data_base64,
            width,
            height,
            captured_at: Utc::now(),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.data_base64)
    }
}

/// Width and height from the IHDR chunk, which sits at bytes 16..24.
fn png_dimensions(data_base64: &str) -> Option<(u32, u32)> {
    // 32 base64 chars decode to exactly the first 24 bytes.
    let head = data_base64.get(..32)?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(head).ok()?;
    if bytes.get(..8)? != PNG_SIGNATURE {
        return None;
    }
    let width = u32::from_be_bytes(bytes.get(16..20)?.try_into().ok()?);
    let height = u32::from_be_bytes(bytes.get(20..24)?.try_into().ok()?);
    Some((width, height))
}

/// Description of one resolved UI element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Driver-assigned element reference, valid for the current session.
    pub element_id: String,
    pub selector: Selector,
    pub text: Option<String>,
    pub class_name: Option<String>,
    pub bounds: Bounds,
    pub enabled: bool,
    pub displayed: bool,
}

/// Foreground app and the state of the session's target app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppStateInfo {
    pub app: AppInfo,
    /// Package / bundle id currently in the foreground.
    pub foreground_app: Option<String>,
    /// Foreground activity (Android only).
    pub current_activity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub wifi_enabled: Option<bool>,
    pub mobile_data_enabled: Option<bool>,
    pub airplane_mode: Option<bool>,
}

/// One device log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub level: String,
    pub message: String,
}

#[async_trait]
pub trait DataGatheringTools: Send + Sync {
    async fn screenshot(&self) -> ToolResult<Screenshot>;

    /// The UI hierarchy as the driver's XML page source.
    async fn get_page_source(&self) -> ToolResult<String>;

    /// Describe the first element matching `selector`.
    async fn get_element_info(&self, selector: &Selector) -> ToolResult<ElementInfo>;

    /// Describe every element matching `selector`. No match is an empty list.
    async fn find_elements(&self, selector: &Selector) -> ToolResult<Vec<ElementInfo>>;

    async fn get_app_state(&self) -> ToolResult<AppStateInfo>;

    async fn get_network_info(&self) -> ToolResult<NetworkInfo>;

    /// Device log lines accumulated since the previous call.
    async fn get_logs(&self) -> ToolResult<Vec<LogEntry>>;

    async fn get_screen_size(&self) -> ToolResult<ScreenSize>;

    async fn get_orientation(&self) -> ToolResult<DeviceOrientation>;

    async fn get_platform_info(&self) -> ToolResult<PlatformInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_png(width: u32, height: u32) -> String {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_screenshot_reads_png_dimensions() {
        let shot = Screenshot::from_base64(fake_png(1080, 2400));
        assert_eq!(shot.width, Some(1080));
        assert_eq!(shot.height, Some(2400));
        assert!(shot.decode().unwrap().starts_with(&PNG_SIGNATURE));
    }

    #[test]
    fn test_screenshot_non_png_has_no_dimensions() {
        let data = base64::engine::general_purpose::STANDARD.encode([0u8; 40]);
        let shot = Screenshot::from_base64(data);
        assert_eq!(shot.width, None);
        assert_eq!(shot.height, None);
    }
}
