//! Platform validation and tool construction.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use screengraph_core::{DriverConfig, Platform, ToolError, ToolExecutionContext, ToolResult};

use crate::android::AndroidAppiumTools;
use crate::backend::PlatformBackend;
use crate::driver::AppiumDriver;
use crate::facade::AppiumTools;
use crate::ios::IosAppiumTools;

/// The closed set of platform names tools can be created for.
pub fn get_supported_platforms() -> BTreeSet<&'static str> {
    Platform::ALL.iter().map(|p| p.as_str()).collect()
}

/// Whether `platform` names a supported platform (case-insensitive).
pub fn validate_platform(platform: &str) -> bool {
    platform.parse::<Platform>().is_ok()
}

/// Create tools for `platform`, bound to `config` and `context`.
///
/// Fails with `UNSUPPORTED_PLATFORM` for an unknown platform before
/// anything is built, then with `INVALID_CONFIGURATION` when the config or
/// context targets a different platform. The returned tools are
/// UNINITIALIZED.
pub fn create_appium_tools(
    platform: &str,
    config: DriverConfig,
    context: ToolExecutionContext,
) -> ToolResult<AppiumTools> {
    build(platform, config, context, None).into()
}

/// Like [`create_appium_tools`], with every session going through `driver`.
pub fn create_appium_tools_with_driver(
    platform: &str,
    config: DriverConfig,
    context: ToolExecutionContext,
    driver: Arc<dyn AppiumDriver>,
) -> ToolResult<AppiumTools> {
    build(platform, config, context, Some(driver)).into()
}

pub fn create_android_tools(
    config: DriverConfig,
    context: ToolExecutionContext,
) -> ToolResult<AppiumTools> {
    create_appium_tools(Platform::Android.as_str(), config, context)
}

pub fn create_ios_tools(
    config: DriverConfig,
    context: ToolExecutionContext,
) -> ToolResult<AppiumTools> {
    create_appium_tools(Platform::Ios.as_str(), config, context)
}

fn build(
    platform: &str,
    config: DriverConfig,
    context: ToolExecutionContext,
    driver: Option<Arc<dyn AppiumDriver>>,
) -> Result<AppiumTools, ToolError> {
    let platform: Platform = platform.parse()?;

    if config.platform() != platform {
        return Err(ToolError::invalid_configuration(format!(
            "requested {platform} tools with a {} driver config",
            config.platform()
        )));
    }
    if context.platform() != platform {
        return Err(ToolError::invalid_configuration(format!(
            "requested {platform} tools with a {} execution context",
            context.platform()
        )));
    }

    let backend = match platform {
        Platform::Android => PlatformBackend::Android(match driver {
            Some(d) => AndroidAppiumTools::with_driver(d),
            None => AndroidAppiumTools::new(),
        }),
        Platform::Ios => PlatformBackend::Ios(IosAppiumTools::new()),
    };

    info!(
        %platform,
        run_id = %context.run_id(),
        device = %config.device_name(),
        "created automation tools"
    );
    Ok(AppiumTools::new(backend, config, context))
}
