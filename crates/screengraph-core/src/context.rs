use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tool::ToolError;
use crate::types::Platform;

/// Correlates every tool call of one automation run.
///
/// Built once by the caller and shared read-only with the tools; nothing in
/// the automation layer mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolExecutionContext {
    run_id: String,
    session_id: String,
    platform: Platform,
    device_id: String,
    created_at: DateTime<Utc>,
}

impl ToolExecutionContext {
    pub fn new(
        run_id: impl Into<String>,
        session_id: impl Into<String>,
        platform: Platform,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            session_id: session_id.into(),
            platform,
            device_id: device_id.into(),
            created_at: Utc::now(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Build an execution context, stamping the current time.
///
/// Fails with `UNSUPPORTED_PLATFORM` for an unknown platform name and with
/// `INVALID_CONFIGURATION` when `run_id` is blank.
pub fn create_execution_context(
    run_id: &str,
    session_id: &str,
    platform: &str,
    device_id: &str,
) -> Result<ToolExecutionContext, ToolError> {
    let platform: Platform = platform.parse()?;
    if run_id.trim().is_empty() {
        return Err(ToolError::invalid_configuration("run_id must not be empty"));
    }
    Ok(ToolExecutionContext::new(
        run_id.trim(),
        session_id.trim(),
        platform,
        device_id.trim(),
    ))
}
