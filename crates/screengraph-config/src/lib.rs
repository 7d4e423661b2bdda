//! # screengraph-config
//!
//! Configuration for ScreenGraph. Reads from `screengraph.toml`, environment
//! variables, and CLI overrides, later sources winning.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::ScreenGraphConfig;
pub use schema::{AppiumConfig, ConfigWarning, LoggingConfig, RunConfig, WarningSeverity};
