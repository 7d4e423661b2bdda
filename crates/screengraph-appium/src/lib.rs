//! # screengraph-appium
//!
//! Mobile UI automation tools over an Appium server.
//!
//! Provides an orchestrator with one object per automation run:
//! - **Connection**: open and close a driver session
//! - **Data gathering**: screenshots, page source, element lookup, app,
//!   network and log state
//! - **Actions**: taps, gestures, text input, app and permission control
//!
//! [`create_appium_tools`] validates the platform and returns an
//! [`AppiumTools`] facade bound to the matching backend. Android is backed by
//! UiAutomator2; iOS is a placeholder that answers `UNSUPPORTED_PLATFORM`.

pub mod actions;
pub mod android;
mod backend;
pub mod catalog;
pub mod connection;
pub mod data_gathering;
pub mod driver;
pub mod facade;
pub mod factory;
pub mod ios;
pub mod mock;
pub mod protocol;
pub mod telemetry;

pub use actions::ActionTools;
pub use android::AndroidAppiumTools;
pub use backend::PlatformTools;
pub use catalog::{has_tool, tool_catalog};
pub use connection::{ConnectionTools, DriverSessionInfo};
pub use data_gathering::{
    AppStateInfo, DataGatheringTools, ElementInfo, LogEntry, NetworkInfo, Screenshot,
};
pub use driver::{AppiumDriver, DriverCommand, DriverError, HttpDriver, HttpMethod};
pub use facade::AppiumTools;
pub use factory::{
    create_android_tools, create_appium_tools, create_appium_tools_with_driver, create_ios_tools,
    get_supported_platforms, validate_platform,
};
pub use ios::IosAppiumTools;
pub use telemetry::{ToolHealthStatus, ToolLogEntry, ToolState, ToolUsageStats};
