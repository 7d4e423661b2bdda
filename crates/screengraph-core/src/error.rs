use thiserror::Error;

use crate::tool::ToolError;

/// Unified error type for configuration loading and the command-line surface.
///
/// Tool operations never return this type: they report expected failures
/// through [`crate::ToolResult`]. This enum covers everything around them.
#[derive(Error, Debug)]
pub enum ScreenGraphError {
    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Tool errors ────────────────────────────────────────────
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScreenGraphError>;
