//! The remote automation endpoint, reached through an opaque driver handle.
//!
//! Backends never talk HTTP themselves. They build a [`DriverCommand`]
//! (method + session-relative path + optional JSON body) and hand it to an
//! [`AppiumDriver`], which returns the unwrapped W3C `value` or a classified
//! [`DriverError`]. [`HttpDriver`] is the real implementation;
//! [`crate::mock::MockDriver`] is the scripted test double.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use screengraph_core::{ToolError, ToolErrorType};

// ─── Commands ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to the automation server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverCommand {
    pub method: HttpMethod,
    /// Path relative to the server root, e.g. `/session/abc/screenshot`.
    pub path: String,
    pub body: Option<Value>,
}

impl DriverCommand {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            path: path.into(),
            body: None,
        }
    }
}

impl fmt::Display for DriverCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

// ─── Errors ─────────────────────────────────────────────────────

/// Failure reported by the driver handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("automation server unreachable: {0}")]
    Unreachable(String),

    #[error("driver command timed out: {0}")]
    Timeout(String),

    #[error("no such element: {0}")]
    NoSuchElement(String),

    #[error("invalid session: {0}")]
    InvalidSession(String),

    #[error("server returned {status} ({error}): {message}")]
    Protocol {
        status: u16,
        error: String,
        message: String,
    },

    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

impl DriverError {
    /// The tool-level classification of this failure.
    pub fn kind(&self) -> ToolErrorType {
        match self {
            DriverError::Unreachable(_) => ToolErrorType::ConnectionFailed,
            DriverError::Timeout(_) => ToolErrorType::Timeout,
            DriverError::NoSuchElement(_) => ToolErrorType::ElementNotFound,
            DriverError::InvalidSession(_) => ToolErrorType::SessionNotFound,
            DriverError::Protocol { .. } | DriverError::InvalidResponse(_) => {
                ToolErrorType::DriverError
            }
        }
    }

    /// Classify a W3C error payload (`{"error": "...", "message": "..."}`).
    pub fn from_w3c(status: u16, error: &str, message: &str) -> Self {
        match error {
            "no such element" | "stale element reference" => {
                DriverError::NoSuchElement(message.to_string())
            }
            "invalid session id" => DriverError::InvalidSession(message.to_string()),
            "timeout" | "script timeout" => DriverError::Timeout(message.to_string()),
            _ => DriverError::Protocol {
                status,
                error: error.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Wrap into a [`ToolError`], keeping `self` as the cause.
    pub fn into_tool_error(self, operation: &str) -> ToolError {
        ToolError::new(self.kind(), format!("{operation} failed: {self}")).with_cause(self)
    }
}

// ─── Driver handle ──────────────────────────────────────────────

/// Send-command/await-response access to the automation server.
#[async_trait]
pub trait AppiumDriver: Send + Sync {
    /// Execute one command and return the response's `value` member.
    async fn send(&self, command: DriverCommand) -> Result<Value, DriverError>;
}

/// [`AppiumDriver`] speaking the W3C WebDriver JSON wire format over HTTP.
pub struct HttpDriver {
    client: reqwest::Client,
    base: String,
}

impl HttpDriver {
    /// Every request is bounded by `request_timeout`.
    pub fn new(server_url: &Url, request_timeout: Duration) -> Result<Self, DriverError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| DriverError::Unreachable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base: server_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl AppiumDriver for HttpDriver {
    async fn send(&self, command: DriverCommand) -> Result<Value, DriverError> {
        let url = self.url_for(&command.path);
        debug!(method = %command.method, %url, "driver command");

        let request = match command.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self
                .client
                .post(&url)
                .json(&command.body.unwrap_or_else(|| Value::Object(Default::default()))),
            HttpMethod::Delete => self.client.delete(&url),
        };

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DriverError::Timeout(format!("{} {}: {e}", command.method, command.path))
            } else {
                DriverError::Unreachable(e.to_string())
            }
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                DriverError::Timeout(e.to_string())
            } else {
                DriverError::InvalidResponse(format!("failed to read body: {e}"))
            }
        })?;

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                DriverError::InvalidResponse(format!("body is not JSON: {e}"))
            } else {
                DriverError::Protocol {
                    status: status.as_u16(),
                    error: "unknown error".into(),
                    message: text.chars().take(200).collect(),
                }
            }
        })?;

        let value = body.get("value").cloned().unwrap_or(Value::Null);
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            let message = value.get("message").and_then(Value::as_str).unwrap_or("");
            return Err(DriverError::from_w3c(status.as_u16(), error, message));
        }
        if !status.is_success() {
            return Err(DriverError::Protocol {
                status: status.as_u16(),
                error: "unknown error".into(),
                message: text.chars().take(200).collect(),
            });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_w3c_error_classification() {
        assert_eq!(
            DriverError::from_w3c(404, "no such element", "x").kind(),
            ToolErrorType::ElementNotFound
        );
        assert_eq!(
            DriverError::from_w3c(404, "invalid session id", "x").kind(),
            ToolErrorType::SessionNotFound
        );
        assert_eq!(
            DriverError::from_w3c(500, "script timeout", "x").kind(),
            ToolErrorType::Timeout
        );
        assert_eq!(
            DriverError::from_w3c(500, "unknown error", "boom").kind(),
            ToolErrorType::DriverError
        );
    }

    #[test]
    fn test_into_tool_error_keeps_cause() {
        let err = DriverError::Unreachable("connection refused".into()).into_tool_error("connect");
        assert_eq!(err.kind, ToolErrorType::ConnectionFailed);
        assert!(err.message.starts_with("connect failed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_url_join_tolerates_trailing_slash() {
        let url = Url::parse("http://localhost:4723/wd/hub/").unwrap();
        let driver = HttpDriver::new(&url, Duration::from_secs(1)).unwrap();
        assert_eq!(
            driver.url_for("/session/abc/source"),
            "http://localhost:4723/wd/hub/session/abc/source"
        );
    }
}
