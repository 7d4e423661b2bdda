//! Mock driver for deterministic testing.
//!
//! Answers commands from scripted routes without any network I/O and
//! records every command it receives.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use crate::driver::{AppiumDriver, DriverCommand, DriverError, HttpMethod};

/// Session id handed out by [`MockDriver::android`].
pub const MOCK_SESSION_ID: &str = "mock-session";

/// A scripted answer.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub result: Result<Value, DriverError>,
    /// Sleep this long before answering.
    pub delay: Option<Duration>,
}

impl MockReply {
    pub fn value(value: Value) -> Self {
        Self {
            result: Ok(value),
            delay: None,
        }
    }

    pub fn error(error: DriverError) -> Self {
        Self {
            result: Err(error),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

struct Route {
    method: HttpMethod,
    /// Matches any path ending with this suffix.
    suffix: String,
    /// Only match `mobile:` executions of this script.
    script: Option<String>,
    reply: MockReply,
    /// `None` answers forever.
    remaining: Option<usize>,
}

/// A driver that returns pre-configured replies.
///
/// Routes registered later take precedence, so a test can start from
/// [`MockDriver::android`] and override single endpoints.
///
/// # Example
/// ```
/// use screengraph_appium::mock::{MockDriver, MockReply};
/// use screengraph_appium::driver::HttpMethod;
/// let driver = MockDriver::android()
///     .on(HttpMethod::Get, "/source", MockReply::value("<hierarchy/>".into()));
/// ```
pub struct MockDriver {
    routes: Mutex<Vec<Route>>,
    commands: Mutex<Vec<DriverCommand>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// A driver with no routes: every command fails as an unknown command.
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// A driver that opens an Android session on a 1080x2400 portrait
    /// emulator and accepts session teardown.
    pub fn android() -> Self {
        let session = format!("/session/{MOCK_SESSION_ID}");
        Self::new()
            .on(
                HttpMethod::Post,
                "/session",
                MockReply::value(json!({
                    "sessionId": MOCK_SESSION_ID,
                    "capabilities": {
                        "platformName": "Android",
                        "platformVersion": "13",
                        "deviceName": "emulator-5554",
                        "deviceModel": "sdk_gphone64_x86_64",
                    }
                })),
            )
            .on(HttpMethod::Post, "/timeouts", MockReply::value(Value::Null))
            .on(
                HttpMethod::Get,
                "/window/rect",
                MockReply::value(json!({"x": 0, "y": 0, "width": 1080, "height": 2400})),
            )
            .on(HttpMethod::Get, "/orientation", MockReply::value(json!("PORTRAIT")))
            .on(HttpMethod::Delete, &session, MockReply::value(Value::Null))
    }

    /// Answer every matching command with `reply`.
    pub fn on(self, method: HttpMethod, suffix: &str, reply: MockReply) -> Self {
        self.push(method, suffix, reply, None);
        self
    }

    /// Answer the next `times` matching commands with `reply`.
    pub fn times(self, method: HttpMethod, suffix: &str, reply: MockReply, times: usize) -> Self {
        self.push(method, suffix, reply, Some(times));
        self
    }

    /// Answer `mobile: <script>` executions with `reply`.
    pub fn on_script(self, script: &str, reply: MockReply) -> Self {
        self.routes.lock().push(Route {
            method: HttpMethod::Post,
            suffix: "/execute/sync".into(),
            script: Some(format!("mobile: {script}")),
            reply,
            remaining: None,
        });
        self
    }

    /// Add a route to a driver already shared with a backend.
    pub fn route(&self, method: HttpMethod, suffix: &str, reply: MockReply) {
        self.push(method, suffix, reply, None);
    }

    fn push(&self, method: HttpMethod, suffix: &str, reply: MockReply, remaining: Option<usize>) {
        self.routes.lock().push(Route {
            method,
            suffix: suffix.to_string(),
            script: None,
            reply,
            remaining,
        });
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Every command received, in order.
    pub fn commands(&self) -> Vec<DriverCommand> {
        self.commands.lock().clone()
    }

    pub fn command_count(&self) -> usize {
        self.commands.lock().len()
    }

    /// How many received commands match `method` and `suffix`.
    pub fn count(&self, method: HttpMethod, suffix: &str) -> usize {
        self.commands
            .lock()
            .iter()
            .filter(|c| c.method == method && c.path.ends_with(suffix))
            .count()
    }

    fn next_reply(&self, command: &DriverCommand) -> MockReply {
        let mut routes = self.routes.lock();
        let found = routes.iter_mut().rev().find(|r| {
            r.method == command.method
                && command.path.ends_with(&r.suffix)
                && r.remaining != Some(0)
                && r.script.as_deref().is_none_or(|s| script_of(command) == Some(s))
        });
        match found {
            Some(route) => {
                if let Some(n) = route.remaining.as_mut() {
                    *n -= 1;
                }
                route.reply.clone()
            }
            None => MockReply::error(DriverError::Protocol {
                status: 404,
                error: "unknown command".into(),
                message: format!("mock has no route for {command}"),
            }),
        }
    }
}

fn script_of(command: &DriverCommand) -> Option<&str> {
    command
        .body
        .as_ref()
        .and_then(|b| b.get("script"))
        .and_then(Value::as_str)
}

#[async_trait]
impl AppiumDriver for MockDriver {
    async fn send(&self, command: DriverCommand) -> Result<Value, DriverError> {
        self.commands.lock().push(command.clone());
        let reply = self.next_reply(&command);
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_later_routes_override_earlier() {
        let driver = MockDriver::new()
            .on(HttpMethod::Get, "/source", MockReply::value(json!("a")))
            .on(HttpMethod::Get, "/source", MockReply::value(json!("b")));
        let v = driver.send(DriverCommand::get("/session/x/source")).await.unwrap();
        assert_eq!(v, json!("b"));
    }

    #[tokio::test]
    async fn test_limited_route_falls_through_when_exhausted() {
        let driver = MockDriver::new()
            .on(HttpMethod::Get, "/source", MockReply::value(json!("steady")))
            .times(HttpMethod::Get, "/source", MockReply::value(json!("once")), 1);
        let first = driver.send(DriverCommand::get("/s/source")).await.unwrap();
        let second = driver.send(DriverCommand::get("/s/source")).await.unwrap();
        assert_eq!(first, json!("once"));
        assert_eq!(second, json!("steady"));
        assert_eq!(driver.count(HttpMethod::Get, "/source"), 2);
    }

    #[tokio::test]
    async fn test_script_routes_match_on_script_name() {
        let driver = MockDriver::new()
            .on_script("getCurrentPackage", MockReply::value(json!("com.example")))
            .on_script("getConnectivity", MockReply::value(json!({"wifi": true})));
        let cmd = DriverCommand::post(
            "/session/x/execute/sync",
            json!({"script": "mobile: getCurrentPackage", "args": [{}]}),
        );
        assert_eq!(driver.send(cmd).await.unwrap(), json!("com.example"));
    }

    #[tokio::test]
    async fn test_unrouted_command_is_protocol_error() {
        let driver = MockDriver::new();
        let err = driver.send(DriverCommand::delete("/session/x")).await.unwrap_err();
        assert!(matches!(err, DriverError::Protocol { status: 404, .. }));
        assert_eq!(driver.command_count(), 1);
    }
}
