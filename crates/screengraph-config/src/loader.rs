use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use screengraph_core::ScreenGraphError;

use crate::schema::ScreenGraphConfig;

/// Loads and reloads the ScreenGraph configuration.
pub struct ConfigLoader {
    config: Arc<RwLock<ScreenGraphConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > SCREENGRAPH_CONFIG env >
    /// ~/.screengraph/screengraph.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("SCREENGRAPH_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".screengraph")
            .join("screengraph.toml")
    }

    fn parse(config_path: &Path) -> screengraph_core::Result<ScreenGraphConfig> {
        let raw = std::fs::read_to_string(config_path)?;
        toml::from_str::<ScreenGraphConfig>(&raw).map_err(|e| {
            ScreenGraphError::Config(format!("failed to parse {}: {}", config_path.display(), e))
        })
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> screengraph_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::parse(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            ScreenGraphConfig::default()
        };

        let config = Self::apply_env_overrides(config);
        Self::check(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Validate, logging warnings and failing on errors.
    fn check(config: &ScreenGraphConfig) -> screengraph_core::Result<()> {
        let warnings = config.validate().map_err(ScreenGraphError::Config)?;
        for w in &warnings {
            warn!("{}", w);
        }
        Ok(())
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> ScreenGraphConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for subscription.
    pub fn shared(&self) -> Arc<RwLock<ScreenGraphConfig>> {
        Arc::clone(&self.config)
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (SCREENGRAPH_APPIUM_URL, SCREENGRAPH_LOG_LEVEL,
    /// SCREENGRAPH_COMMAND_TIMEOUT).
    fn apply_env_overrides(mut config: ScreenGraphConfig) -> ScreenGraphConfig {
        if let Ok(v) = std::env::var("SCREENGRAPH_APPIUM_URL") {
            config.appium.server_url = v;
        }
        if let Ok(v) = std::env::var("SCREENGRAPH_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("SCREENGRAPH_COMMAND_TIMEOUT") {
            match v.parse::<u64>() {
                Ok(secs) => config.appium.command_timeout_secs = secs,
                Err(_) => warn!(value = %v, "ignoring non-numeric SCREENGRAPH_COMMAND_TIMEOUT"),
            }
        }
        config
    }

    /// Reload the config from disk. On a parse or validation error the
    /// current config is kept.
    pub fn reload(&self) -> screengraph_core::Result<()> {
        if !self.config_path.exists() {
            return Err(ScreenGraphError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let new_config = Self::apply_env_overrides(Self::parse(&self.config_path)?);
        Self::check(&new_config)?;
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }
}
