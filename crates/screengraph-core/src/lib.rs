//! # screengraph-core
//!
//! Shared vocabulary for the ScreenGraph automation tools: the result
//! envelope and error taxonomy every tool operation returns, the validated
//! driver configuration and run context, and the platform, selector and
//! gesture types the capability interfaces speak in.

pub mod context;
pub mod driver;
pub mod error;
pub mod tool;
pub mod types;

pub use context::{ToolExecutionContext, create_execution_context};
pub use driver::{AppIdentity, DriverConfig, DriverConfigRequest, create_driver_config};
pub use error::{Result, ScreenGraphError};
pub use tool::{ToolCategory, ToolError, ToolErrorType, ToolMetadata, ToolResult};
pub use types::*;
