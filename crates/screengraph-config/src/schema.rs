use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use screengraph_core::Platform;
use screengraph_core::driver::{
    DEFAULT_COMMAND_TIMEOUT, DEFAULT_IMPLICIT_WAIT, DEFAULT_NEW_COMMAND_TIMEOUT,
    DEFAULT_SERVER_URL,
};

/// Root configuration, mapped from `screengraph.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenGraphConfig {
    pub appium: AppiumConfig,
    pub logging: LoggingConfig,
    pub run: RunConfig,
}

// ── Appium ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppiumConfig {
    /// Appium server URL used when a request does not name one.
    pub server_url: String,
    /// Upper bound in seconds for every remote driver command.
    pub command_timeout_secs: u64,
    /// Implicit wait in milliseconds applied to element lookups.
    pub implicit_wait_ms: u64,
    /// Idle seconds before the Appium server reaps an abandoned session.
    pub new_command_timeout_secs: u64,
}

impl Default for AppiumConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
            implicit_wait_ms: u64::try_from(DEFAULT_IMPLICIT_WAIT.as_millis()).unwrap_or(3000),
            new_command_timeout_secs: DEFAULT_NEW_COMMAND_TIMEOUT.as_secs(),
        }
    }
}

impl AppiumConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }

    pub fn new_command_timeout(&self) -> Duration {
        Duration::from_secs(self.new_command_timeout_secs)
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
    /// Log file path (None = stderr only).
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
            file: None,
        }
    }
}

// ── Run defaults ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Platform used when the caller does not name one.
    pub default_platform: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            default_platform: Platform::Android.as_str().into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Info => "info",
        };
        write!(f, "{} {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl ScreenGraphConfig {
    /// Check the config for problems. Returns all warnings, or an error
    /// message listing every `Error`-severity finding.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Appium server URL ───
        match url::Url::parse(&self.appium.server_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            Ok(u) => warnings.push(ConfigWarning {
                field: "appium.server_url".into(),
                message: format!("scheme '{}' is not supported", u.scheme()),
                severity: WarningSeverity::Error,
                hint: Some("Use an http:// or https:// URL, e.g. 'http://localhost:4723'".into()),
            }),
            Err(e) => warnings.push(ConfigWarning {
                field: "appium.server_url".into(),
                message: format!("'{}' is not a valid URL: {}", self.appium.server_url, e),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'http://localhost:4723'".into()),
            }),
        }

        // ── Command timeout ───
        if self.appium.command_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                field: "appium.command_timeout_secs".into(),
                message: "command timeout is 0; every driver call would time out".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 30".into()),
            });
        } else if self.appium.command_timeout_secs > 600 {
            warnings.push(ConfigWarning {
                field: "appium.command_timeout_secs".into(),
                message: format!(
                    "command timeout {}s is very long; a hung device stalls the run",
                    self.appium.command_timeout_secs
                ),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }

        // ── Implicit wait vs. command timeout ───
        if self.appium.implicit_wait() >= self.appium.command_timeout()
            && self.appium.command_timeout_secs > 0
        {
            warnings.push(ConfigWarning {
                field: "appium.implicit_wait_ms".into(),
                message: "implicit wait is not shorter than the command timeout".into(),
                severity: WarningSeverity::Warning,
                hint: Some(
                    "Element lookups that miss will report TIMEOUT instead of ELEMENT_NOT_FOUND"
                        .into(),
                ),
            });
        }

        // ── New-command timeout ───
        if self.appium.new_command_timeout_secs < self.appium.command_timeout_secs {
            warnings.push(ConfigWarning {
                field: "appium.new_command_timeout_secs".into(),
                message: "server-side idle timeout is shorter than the command timeout".into(),
                severity: WarningSeverity::Warning,
                hint: Some("The server may reap sessions between slow commands".into()),
            });
        }

        // ── Default platform ───
        if self.run.default_platform.parse::<Platform>().is_err() {
            warnings.push(ConfigWarning {
                field: "run.default_platform".into(),
                message: format!("unsupported platform '{}'", self.run.default_platform),
                severity: WarningSeverity::Error,
                hint: Some(format!("Supported: {}", Platform::supported_list())),
            });
        }

        // ── Logging format ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // ── Logging level ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
