//! `screengraph probe`: one end-to-end pass over a real device.

use anyhow::Context;
use clap::Args;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use screengraph_appium::{
    ConnectionTools, DataGatheringTools, Screenshot, create_appium_tools,
};
use screengraph_config::ScreenGraphConfig;
use screengraph_core::{
    DriverConfig, DriverConfigRequest, ToolResult, create_driver_config, create_execution_context,
};

#[derive(Args, Debug)]
pub(super) struct ProbeArgs {
    /// Target platform (defaults to run.default_platform)
    #[arg(short, long)]
    platform: Option<String>,

    /// Device name or UDID, e.g. emulator-5554
    #[arg(long)]
    device_name: String,

    /// OS version of the device, e.g. 14
    #[arg(long)]
    platform_version: String,

    /// Android package to start
    #[arg(long)]
    app_package: Option<String>,

    /// Android activity to start (requires --app-package)
    #[arg(long)]
    app_activity: Option<String>,

    /// iOS bundle id to start
    #[arg(long)]
    bundle_id: Option<String>,

    /// Appium server URL (defaults to appium.server_url)
    #[arg(long)]
    server_url: Option<String>,

    /// Run identifier used in logs (random when omitted)
    #[arg(long)]
    run_id: Option<String>,

    /// Save a screenshot to this PNG file
    #[arg(long)]
    screenshot: Option<PathBuf>,
}

impl ProbeArgs {
    fn platform<'a>(&'a self, config: &'a ScreenGraphConfig) -> &'a str {
        self.platform
            .as_deref()
            .unwrap_or(&config.run.default_platform)
    }

    fn driver_config(
        &self,
        config: &ScreenGraphConfig,
    ) -> Result<DriverConfig, screengraph_core::ToolError> {
        let request = DriverConfigRequest {
            server_url: Some(
                self.server_url
                    .clone()
                    .unwrap_or_else(|| config.appium.server_url.clone()),
            ),
            platform: self.platform(config).to_string(),
            device_name: self.device_name.clone(),
            platform_version: self.platform_version.clone(),
            app_package: self.app_package.clone(),
            app_activity: self.app_activity.clone(),
            bundle_id: self.bundle_id.clone(),
        };
        Ok(create_driver_config(&request)?
            .with_command_timeout(config.appium.command_timeout())
            .with_implicit_wait(config.appium.implicit_wait())
            .with_new_command_timeout(config.appium.new_command_timeout()))
    }
}

pub(super) async fn cmd_probe(
    config: &ScreenGraphConfig,
    args: ProbeArgs,
) -> screengraph_core::Result<()> {
    let platform = args.platform(config).to_string();
    let driver_config = args.driver_config(config)?;
    let run_id = args
        .run_id
        .clone()
        .unwrap_or_else(|| format!("probe-{}", Uuid::new_v4()));
    let context = create_execution_context(
        &run_id,
        &Uuid::new_v4().to_string(),
        &platform,
        &args.device_name,
    )?;

    let mut tools =
        create_appium_tools(&platform, driver_config.clone(), context.clone()).into_result()?;
    tools.initialize(context).into_result()?;

    info!(%run_id, server = %driver_config.server_url(), "probing device");
    let connected = tools.connect(&driver_config).await;
    let mut report = json!({
        "run_id": run_id,
        "platform": platform,
        "connect": &connected,
    });

    let mut shot = None;
    if connected.success() {
        report["platform_info"] = serde_json::to_value(tools.get_platform_info().await)?;
        report["app_state"] = serde_json::to_value(tools.get_app_state().await)?;
        let source = tools.get_page_source().await.map(|s| s.len());
        report["page_source_bytes"] = serde_json::to_value(source)?;
        if args.screenshot.is_some() {
            shot = Some(tools.screenshot().await);
        }
        tools.disconnect().await;
    }

    if let (Some(path), Some(shot)) = (&args.screenshot, shot) {
        report["screenshot"] = save_screenshot(shot, path)?;
    }

    report["usage_stats"] = serde_json::to_value(tools.usage_stats())?;
    report["health"] = serde_json::to_value(tools.health_status())?;
    report["invocation_log"] = serde_json::to_value(tools.invocation_log())?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    connected.into_result()?;
    Ok(())
}

/// Write the image and summarize it. A failed capture is reported, not raised.
fn save_screenshot(shot: ToolResult<Screenshot>, path: &Path) -> screengraph_core::Result<Value> {
    let Some(image) = shot.data() else {
        warn!("screenshot failed; nothing written");
        return Ok(serde_json::to_value(&shot)?);
    };
    let bytes = image
        .decode()
        .context("screenshot payload is not valid base64")?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("cannot write screenshot to {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "screenshot saved");

    Ok(json!({
        "path": path,
        "bytes": bytes.len(),
        "width": image.width,
        "height": image.height,
    }))
}
