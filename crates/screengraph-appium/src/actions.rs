//! State-mutating interaction capability.
//!
//! Targeted operations check their target before dispatch: a coordinate
//! outside the screen, or an element whose bounds miss the screen, fails
//! with `ELEMENT_NOT_FOUND` and nothing is sent to the device.

use async_trait::async_trait;

use screengraph_core::{
    DeepLinkInfo, DeviceOrientation, Point, ScrollDirection, Selector, SwipeDirection,
    SystemPermission, ToolResult, TouchGesture,
};

#[async_trait]
pub trait ActionTools: Send + Sync {
    /// Tap the first element matching `selector`.
    async fn tap(&self, selector: &Selector) -> ToolResult<()>;

    async fn tap_at(&self, point: Point) -> ToolResult<()>;

    async fn long_press(&self, selector: &Selector, duration_ms: u64) -> ToolResult<()>;

    /// Full-screen swipe through the screen center.
    async fn swipe(&self, direction: SwipeDirection) -> ToolResult<()>;

    /// Move the content one page in `direction`.
    async fn scroll(&self, direction: ScrollDirection) -> ToolResult<()>;

    async fn perform_gesture(&self, gesture: &TouchGesture) -> ToolResult<()>;

    /// Type into the first element matching `selector`.
    async fn input_text(&self, selector: &Selector, text: &str) -> ToolResult<()>;

    async fn clear_text(&self, selector: &Selector) -> ToolResult<()>;

    async fn press_back(&self) -> ToolResult<()>;

    async fn hide_keyboard(&self) -> ToolResult<()>;

    /// Bring an installed app to the foreground, starting it if needed.
    async fn launch_app(&self, app_id: &str) -> ToolResult<()>;

    /// Returns whether a running app was actually stopped.
    async fn terminate_app(&self, app_id: &str) -> ToolResult<bool>;

    async fn grant_permission(&self, app_id: &str, permission: SystemPermission) -> ToolResult<()>;

    async fn revoke_permission(&self, app_id: &str, permission: SystemPermission)
    -> ToolResult<()>;

    async fn open_deep_link(&self, link: &DeepLinkInfo) -> ToolResult<()>;

    async fn set_orientation(&self, orientation: DeviceOrientation) -> ToolResult<()>;
}
