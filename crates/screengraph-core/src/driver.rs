//! Connection parameters for an Appium driver session.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::tool::ToolError;
use crate::types::Platform;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:4723";
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_IMPLICIT_WAIT: Duration = Duration::from_millis(3000);
pub const DEFAULT_NEW_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Which app the session targets, keyed by platform.
///
/// Android identifies apps by package + launchable activity, iOS by bundle
/// id. Mixing the two is unrepresentable. Both variants allow attaching to
/// whatever app is in the foreground by leaving the identity empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum AppIdentity {
    Android {
        app_package: Option<String>,
        app_activity: Option<String>,
    },
    Ios {
        bundle_id: Option<String>,
    },
}

impl AppIdentity {
    pub fn platform(&self) -> Platform {
        match self {
            AppIdentity::Android { .. } => Platform::Android,
            AppIdentity::Ios { .. } => Platform::Ios,
        }
    }

    /// Package name or bundle id of the target app, if one was given.
    pub fn app_id(&self) -> Option<&str> {
        match self {
            AppIdentity::Android { app_package, .. } => app_package.as_deref(),
            AppIdentity::Ios { bundle_id } => bundle_id.as_deref(),
        }
    }
}

/// Immutable, validated connection parameters for one driver session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverConfig {
    server_url: Url,
    device_name: String,
    platform_version: String,
    identity: AppIdentity,
    command_timeout: Duration,
    implicit_wait: Duration,
    new_command_timeout: Duration,
}

impl DriverConfig {
    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    pub fn platform(&self) -> Platform {
        self.identity.platform()
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn platform_version(&self) -> &str {
        &self.platform_version
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    pub fn app_id(&self) -> Option<&str> {
        self.identity.app_id()
    }

    /// Upper bound for every remote call made with this config.
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// How long element lookups poll before reporting no match.
    pub fn implicit_wait(&self) -> Duration {
        self.implicit_wait
    }

    /// Idle time after which the Appium server reaps the session on its own.
    pub fn new_command_timeout(&self) -> Duration {
        self.new_command_timeout
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_implicit_wait(mut self, wait: Duration) -> Self {
        self.implicit_wait = wait;
        self
    }

    pub fn with_new_command_timeout(mut self, timeout: Duration) -> Self {
        self.new_command_timeout = timeout;
        self
    }
}

/// Raw, unvalidated driver parameters as received from a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfigRequest {
    /// Appium server URL; defaults to `http://localhost:4723`.
    pub server_url: Option<String>,
    pub platform: String,
    pub device_name: String,
    pub platform_version: String,
    pub app_package: Option<String>,
    pub app_activity: Option<String>,
    pub bundle_id: Option<String>,
}

/// Blank optional strings count as absent.
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(field: &str, value: &str) -> Result<String, ToolError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ToolError::invalid_configuration(format!(
            "{field} must not be empty"
        )));
    }
    Ok(value.to_string())
}

fn parse_server_url(raw: Option<String>) -> Result<Url, ToolError> {
    let raw = raw.unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let url = Url::parse(&raw).map_err(|e| {
        ToolError::invalid_configuration(format!("server_url '{raw}' is not a valid URL"))
            .with_cause(e)
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ToolError::invalid_configuration(format!(
            "server_url '{raw}' must use http or https"
        )));
    }
    Ok(url)
}

/// Validate a request and derive an immutable [`DriverConfig`].
///
/// Pure: performs no I/O. Fails with `UNSUPPORTED_PLATFORM` for an unknown
/// platform and `INVALID_CONFIGURATION` for missing fields or identity fields
/// that do not belong to the platform.
pub fn create_driver_config(request: &DriverConfigRequest) -> Result<DriverConfig, ToolError> {
    let platform: Platform = request.platform.parse()?;
    let server_url = parse_server_url(present(&request.server_url))?;
    let device_name = required("device_name", &request.device_name)?;
    let platform_version = required("platform_version", &request.platform_version)?;

    let app_package = present(&request.app_package);
    let app_activity = present(&request.app_activity);
    let bundle_id = present(&request.bundle_id);

    let identity = match platform {
        Platform::Android => {
            if bundle_id.is_some() {
                return Err(ToolError::invalid_configuration(
                    "bundle_id is not valid for platform android; use app_package/app_activity",
                ));
            }
            if app_activity.is_some() && app_package.is_none() {
                return Err(ToolError::invalid_configuration(
                    "app_activity requires app_package",
                ));
            }
            AppIdentity::Android {
                app_package,
                app_activity,
            }
        }
        Platform::Ios => {
            if app_package.is_some() || app_activity.is_some() {
                return Err(ToolError::invalid_configuration(
                    "app_package/app_activity are not valid for platform ios; use bundle_id",
                ));
            }
            AppIdentity::Ios { bundle_id }
        }
    };

    Ok(DriverConfig {
        server_url,
        device_name,
        platform_version,
        identity,
        command_timeout: DEFAULT_COMMAND_TIMEOUT,
        implicit_wait: DEFAULT_IMPLICIT_WAIT,
        new_command_timeout: DEFAULT_NEW_COMMAND_TIMEOUT,
    })
}
