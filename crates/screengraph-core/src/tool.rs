//! The uniform outcome envelope returned by every tool operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

// ─── Error taxonomy ─────────────────────────────────────────────

/// Closed set of failure kinds a tool operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolErrorType {
    ConnectionFailed,
    SessionNotFound,
    ElementNotFound,
    Timeout,
    UnsupportedPlatform,
    InvalidConfiguration,
    DriverError,
    Unknown,
}

impl ToolErrorType {
    pub const ALL: [ToolErrorType; 8] = [
        ToolErrorType::ConnectionFailed,
        ToolErrorType::SessionNotFound,
        ToolErrorType::ElementNotFound,
        ToolErrorType::Timeout,
        ToolErrorType::UnsupportedPlatform,
        ToolErrorType::InvalidConfiguration,
        ToolErrorType::DriverError,
        ToolErrorType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorType::ConnectionFailed => "CONNECTION_FAILED",
            ToolErrorType::SessionNotFound => "SESSION_NOT_FOUND",
            ToolErrorType::ElementNotFound => "ELEMENT_NOT_FOUND",
            ToolErrorType::Timeout => "TIMEOUT",
            ToolErrorType::UnsupportedPlatform => "UNSUPPORTED_PLATFORM",
            ToolErrorType::InvalidConfiguration => "INVALID_CONFIGURATION",
            ToolErrorType::DriverError => "DRIVER_ERROR",
            ToolErrorType::Unknown => "UNKNOWN",
        }
    }

    /// Failures raised while building configs or tools, before any session exists.
    /// Retrying with the same inputs cannot succeed.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            ToolErrorType::InvalidConfiguration | ToolErrorType::UnsupportedPlatform
        )
    }

    /// Runtime failures where a retry of the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ToolErrorType::ConnectionFailed | ToolErrorType::Timeout)
    }
}

impl fmt::Display for ToolErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified tool failure.
///
/// The optional `cause` keeps the lower-level failure (HTTP error, parse
/// error, ...) for diagnostics. It is exposed through
/// [`std::error::Error::source`] and serialized as a string.
#[derive(Error, Debug, Clone, Serialize)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: ToolErrorType,
    pub message: String,
    #[source]
    #[serde(serialize_with = "serialize_cause", skip_serializing_if = "Option::is_none")]
    cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

fn serialize_cause<S: Serializer>(
    cause: &Option<Arc<dyn std::error::Error + Send + Sync>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match cause {
        Some(err) => serializer.serialize_str(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

impl ToolError {
    pub fn new(kind: ToolErrorType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the lower-level failure that produced this error.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(ToolErrorType::ConnectionFailed, message)
    }

    pub fn session_not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorType::SessionNotFound, message)
    }

    pub fn element_not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorType::ElementNotFound, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorType::Timeout, message)
    }

    pub fn unsupported_platform(message: impl Into<String>) -> Self {
        Self::new(ToolErrorType::UnsupportedPlatform, message)
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ToolErrorType::InvalidConfiguration, message)
    }

    pub fn driver_error(message: impl Into<String>) -> Self {
        Self::new(ToolErrorType::DriverError, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ToolErrorType::Unknown, message)
    }
}

// ─── Result envelope ────────────────────────────────────────────

/// Outcome of one tool call: either data or an error, never both, stamped
/// with the time the outcome was produced.
#[derive(Debug, Clone)]
pub struct ToolResult<T> {
    outcome: Result<T, ToolError>,
    timestamp: DateTime<Utc>,
}

impl<T> ToolResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            outcome: Ok(data),
            timestamp: Utc::now(),
        }
    }

    pub fn err(error: ToolError) -> Self {
        Self {
            outcome: Err(error),
            timestamp: Utc::now(),
        }
    }

    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn data(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.outcome.as_ref().err()
    }

    pub fn error_kind(&self) -> Option<ToolErrorType> {
        self.error().map(|e| e.kind)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn into_result(self) -> Result<T, ToolError> {
        self.outcome
    }

    pub fn into_data(self) -> Option<T> {
        self.outcome.ok()
    }

    /// Transform the success payload, keeping the original timestamp.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ToolResult<U> {
        ToolResult {
            outcome: self.outcome.map(f),
            timestamp: self.timestamp,
        }
    }
}

impl<T> From<Result<T, ToolError>> for ToolResult<T> {
    fn from(outcome: Result<T, ToolError>) -> Self {
        Self {
            outcome,
            timestamp: Utc::now(),
        }
    }
}

impl<T> From<ToolError> for ToolResult<T> {
    fn from(error: ToolError) -> Self {
        Self::err(error)
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ToolError>,
    timestamp: DateTime<Utc>,
}

impl<T: Serialize> Serialize for ToolResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Envelope {
            success: self.success(),
            data: self.data(),
            error: self.error(),
            timestamp: self.timestamp,
        }
        .serialize(serializer)
    }
}

// ─── Tool catalog metadata ──────────────────────────────────────

/// Which capability interface a tool operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Connection,
    DataGathering,
    Action,
}

/// Static description of one tool operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Operation name, e.g. "screenshot", "tap".
    pub name: String,
    /// Human-readable description for orchestrators.
    pub description: String,
    pub category: ToolCategory,
    /// Whether the operation changes device or app state.
    #[serde(default)]
    pub is_mutating: bool,
}
