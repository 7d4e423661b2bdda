//! Session lifecycle capability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use screengraph_core::{DeviceOrientation, DriverConfig, PlatformInfo, ScreenSize, ToolResult};

/// State of a live driver session, captured at connect time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSessionInfo {
    /// Session identifier assigned by the automation server.
    pub session_id: String,
    pub connected_at: DateTime<Utc>,
    pub orientation: DeviceOrientation,
    pub screen_size: ScreenSize,
    pub platform_info: PlatformInfo,
}

#[async_trait]
pub trait ConnectionTools: Send + Sync {
    /// Open a driver session. Fails with `CONNECTION_FAILED` when a session
    /// is already open; a second session is never created.
    async fn connect(&mut self, config: &DriverConfig) -> ToolResult<DriverSessionInfo>;

    /// Close the session if there is one. Always succeeds.
    async fn disconnect(&mut self) -> ToolResult<()>;

    fn is_connected(&self) -> bool;
}
