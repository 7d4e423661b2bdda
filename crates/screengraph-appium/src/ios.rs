//! iOS backend placeholder.
//!
//! The XCUITest backend is not implemented yet. Every operation returns a
//! well-formed `UNSUPPORTED_PLATFORM` result so callers can branch on it the
//! same way they branch on any other failure. `disconnect` still succeeds
//! and `is_connected` is always false.

use async_trait::async_trait;

use screengraph_core::{
    DeepLinkInfo, DeviceOrientation, DriverConfig, PlatformInfo, Point, ScreenSize,
    ScrollDirection, Selector, SwipeDirection, SystemPermission, ToolError, ToolResult,
    TouchGesture,
};

use crate::actions::ActionTools;
use crate::connection::{ConnectionTools, DriverSessionInfo};
use crate::data_gathering::{
    AppStateInfo, DataGatheringTools, ElementInfo, LogEntry, NetworkInfo, Screenshot,
};

#[derive(Debug, Default)]
pub struct IosAppiumTools;

impl IosAppiumTools {
    pub fn new() -> Self {
        Self
    }
}

fn unsupported<T>(operation: &str) -> ToolResult<T> {
    ToolResult::err(ToolError::unsupported_platform(format!(
        "{operation} is not supported on ios yet: the XCUITest backend is not implemented"
    )))
}

#[async_trait]
impl ConnectionTools for IosAppiumTools {
    async fn connect(&mut self, _config: &DriverConfig) -> ToolResult<DriverSessionInfo> {
        unsupported("connect")
    }

    async fn disconnect(&mut self) -> ToolResult<()> {
        ToolResult::ok(())
    }

    fn is_connected(&self) -> bool {
        false
    }
}

#[async_trait]
impl DataGatheringTools for IosAppiumTools {
    async fn screenshot(&self) -> ToolResult<Screenshot> {
        unsupported("screenshot")
    }

    async fn get_page_source(&self) -> ToolResult<String> {
        unsupported("get_page_source")
    }

    async fn get_element_info(&self, _selector: &Selector) -> ToolResult<ElementInfo> {
        unsupported("get_element_info")
    }

    async fn find_elements(&self, _selector: &Selector) -> ToolResult<Vec<ElementInfo>> {
        unsupported("find_elements")
    }

    async fn get_app_state(&self) -> ToolResult<AppStateInfo> {
        unsupported("get_app_state")
    }

    async fn get_network_info(&self) -> ToolResult<NetworkInfo> {
        unsupported("get_network_info")
    }

    async fn get_logs(&self) -> ToolResult<Vec<LogEntry>> {
        unsupported("get_logs")
    }

    async fn get_screen_size(&self) -> ToolResult<ScreenSize> {
        unsupported("get_screen_size")
    }

    async fn get_orientation(&self) -> ToolResult<DeviceOrientation> {
        unsupported("get_orientation")
    }

    async fn get_platform_info(&self) -> ToolResult<PlatformInfo> {
        unsupported("get_platform_info")
    }
}

#[async_trait]
impl ActionTools for IosAppiumTools {
    async fn tap(&self, _selector: &Selector) -> ToolResult<()> {
        unsupported("tap")
    }

    async fn tap_at(&self, _point: Point) -> ToolResult<()> {
        unsupported("tap_at")
    }

    async fn long_press(&self, _selector: &Selector, _duration_ms: u64) -> ToolResult<()> {
        unsupported("long_press")
    }

    async fn swipe(&self, _direction: SwipeDirection) -> ToolResult<()> {
        unsupported("swipe")
    }

    async fn scroll(&self, _direction: ScrollDirection) -> ToolResult<()> {
        unsupported("scroll")
    }

    async fn perform_gesture(&self, _gesture: &TouchGesture) -> ToolResult<()> {
        unsupported("perform_gesture")
    }

    async fn input_text(&self, _selector: &Selector, _text: &str) -> ToolResult<()> {
        unsupported("input_text")
    }

    async fn clear_text(&self, _selector: &Selector) -> ToolResult<()> {
        unsupported("clear_text")
    }

    async fn press_back(&self) -> ToolResult<()> {
        unsupported("press_back")
    }

    async fn hide_keyboard(&self) -> ToolResult<()> {
        unsupported("hide_keyboard")
    }

    async fn launch_app(&self, _app_id: &str) -> ToolResult<()> {
        unsupported("launch_app")
    }

    async fn terminate_app(&self, _app_id: &str) -> ToolResult<bool> {
        unsupported("terminate_app")
    }

    async fn grant_permission(
        &self,
        _app_id: &str,
        _permission: SystemPermission,
    ) -> ToolResult<()> {
        unsupported("grant_permission")
    }

    async fn revoke_permission(
        &self,
        _app_id: &str,
        _permission: SystemPermission,
    ) -> ToolResult<()> {
        unsupported("revoke_permission")
    }

    async fn open_deep_link(&self, _link: &DeepLinkInfo) -> ToolResult<()> {
        unsupported("open_deep_link")
    }

    async fn set_orientation(&self, _orientation: DeviceOrientation) -> ToolResult<()> {
        unsupported("set_orientation")
    }
}
