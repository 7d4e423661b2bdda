//! The composite tool object an orchestrator holds.
//!
//! [`AppiumTools`] owns one platform backend and drives it through the
//! session lifecycle:
//!
//! ```text
//! UNINITIALIZED -> INITIALIZED -> CONNECTED <-> DISCONNECTED
//!                                     any state -> DISPOSED
//! ```
//!
//! Every call that returns a [`ToolResult`] goes through the same wrapper:
//! it is timed, bounded by the config's command timeout, appended to the
//! invocation log, counted in the usage stats, folded into the health
//! status and emitted as one `tracing` event. Data-gathering and action
//! calls outside CONNECTED are answered with `SESSION_NOT_FOUND` before the
//! backend sees them. The iOS backend has no session to gate on and answers
//! every call with `UNSUPPORTED_PLATFORM` itself.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use screengraph_core::{
    DeepLinkInfo, DeviceOrientation, DriverConfig, Platform, PlatformInfo, Point, ScreenSize,
    ScrollDirection, Selector, SwipeDirection, SystemPermission, ToolError,
    ToolExecutionContext, ToolResult, TouchGesture,
};

use crate::actions::ActionTools;
use crate::backend::PlatformBackend;
use crate::connection::{ConnectionTools, DriverSessionInfo};
use crate::data_gathering::{
    AppStateInfo, DataGatheringTools, ElementInfo, LogEntry, NetworkInfo, Screenshot,
};
use crate::telemetry::{Telemetry, ToolHealthStatus, ToolLogEntry, ToolState, ToolUsageStats};

pub struct AppiumTools {
    backend: PlatformBackend,
    config: DriverConfig,
    context: ToolExecutionContext,
    state: ToolState,
    telemetry: Mutex<Telemetry>,
}

impl fmt::Debug for AppiumTools {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppiumTools")
            .field("platform", &self.platform())
            .field("state", &self.state)
            .field("run_id", &self.context.run_id())
            .finish_non_exhaustive()
    }
}

impl AppiumTools {
    pub(crate) fn new(
        backend: PlatformBackend,
        config: DriverConfig,
        context: ToolExecutionContext,
    ) -> Self {
        Self {
            backend,
            config,
            context,
            state: ToolState::Uninitialized,
            telemetry: Mutex::new(Telemetry::default()),
        }
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn platform(&self) -> Platform {
        self.backend.platform()
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn context(&self) -> &ToolExecutionContext {
        &self.context
    }

    /// The config of the current (or most recent) session.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn session_info(&self) -> Option<DriverSessionInfo> {
        self.backend.session_info()
    }

    pub fn health_status(&self) -> ToolHealthStatus {
        self.telemetry.lock().health(self.state, self.is_connected())
    }

    pub fn usage_stats(&self) -> ToolUsageStats {
        self.telemetry.lock().stats()
    }

    /// Zero the usage counters. The invocation log and health are kept.
    pub fn reset_usage_stats(&self) {
        self.telemetry.lock().reset_stats();
    }

    /// Every recorded invocation, in call order.
    pub fn invocation_log(&self) -> Vec<ToolLogEntry> {
        self.telemetry.lock().log()
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Bind the run context and move to INITIALIZED. No I/O.
    pub fn initialize(&mut self, context: ToolExecutionContext) -> ToolResult<()> {
        let started = Instant::now();
        let result: ToolResult<()> = self.bind_context(context).into();
        self.record("initialize", self.context.run_id().to_string(), &result, started.elapsed());
        result
    }

    fn bind_context(&mut self, context: ToolExecutionContext) -> Result<(), ToolError> {
        if context.platform() != self.platform() {
            return Err(ToolError::invalid_configuration(format!(
                "context is for {}, but these tools drive {}",
                context.platform(),
                self.platform()
            )));
        }
        match self.state {
            ToolState::Uninitialized => {
                self.context = context;
                self.state = ToolState::Initialized;
                Ok(())
            }
            ToolState::Disposed => Err(ToolError::session_not_found("tools have been disposed")),
            state => {
                warn!(%state, "initialize called again; keeping the bound context");
                Ok(())
            }
        }
    }

    /// Release the session and refuse every later call. Idempotent.
    pub async fn dispose(&mut self) -> ToolResult<()> {
        let started = Instant::now();
        if self.state != ToolState::Disposed {
            self.release().await;
            self.state = ToolState::Disposed;
            info!(run_id = %self.context.run_id(), "tools disposed");
        }
        let result = ToolResult::ok(());
        self.record("dispose", String::new(), &result, started.elapsed());
        result
    }

    /// Close the backend session. Never fails: a slow or failing delete is
    /// logged and the handle is dropped regardless.
    async fn release(&mut self) {
        let limit = self.config.command_timeout();
        if tokio::time::timeout(limit, self.backend.tools_mut().disconnect())
            .await
            .is_err()
        {
            warn!(timeout_ms = limit.as_millis() as u64, "session release timed out");
        }
    }

    async fn open(&mut self, config: &DriverConfig) -> ToolResult<DriverSessionInfo> {
        match self.state {
            ToolState::Initialized | ToolState::Disconnected => {}
            ToolState::Uninitialized => {
                return ToolResult::err(ToolError::connection_failed(
                    "initialize must be called before connect",
                ));
            }
            ToolState::Connected => {
                return ToolResult::err(ToolError::connection_failed(
                    "already connected; disconnect before connecting again",
                ));
            }
            ToolState::Disposed => {
                return ToolResult::err(ToolError::connection_failed("tools have been disposed"));
            }
        }
        if config.platform() != self.platform() {
            return ToolResult::err(ToolError::invalid_configuration(format!(
                "config is for {}, but these tools drive {}",
                config.platform(),
                self.platform()
            )));
        }

        let limit = config.command_timeout();
        let connecting = self.backend.tools_mut().connect(config);
        let result = match tokio::time::timeout(limit, connecting).await {
            Ok(r) => r,
            Err(_) => {
                // The server may already hold a session for the abandoned connect.
                self.release().await;
                ToolResult::err(ToolError::connection_failed(format!(
                    "no session from {} within {}ms",
                    config.server_url(),
                    limit.as_millis()
                )))
            }
        };
        if result.success() {
            self.config = config.clone();
            self.state = ToolState::Connected;
        }
        result
    }

    // ── Call wrapper ───────────────────────────────────────────

    fn gate(&self, tool: &str) -> Result<(), ToolError> {
        match self.state {
            ToolState::Disposed => Err(ToolError::session_not_found(format!(
                "{tool}: tools have been disposed"
            ))),
            ToolState::Connected => Ok(()),
            _ if self.platform() == Platform::Ios => Ok(()),
            state => Err(ToolError::session_not_found(format!(
                "{tool} requires a connected session (state: {state})"
            ))),
        }
    }

    async fn run<T>(
        &self,
        tool: &'static str,
        arguments: String,
        call: impl Future<Output = ToolResult<T>>,
    ) -> ToolResult<T> {
        let started = Instant::now();
        let result = match self.gate(tool) {
            Ok(()) => {
                let limit = self.config.command_timeout();
                match tokio::time::timeout(limit, call).await {
                    Ok(r) => r,
                    Err(_) => ToolResult::err(ToolError::timeout(format!(
                        "{tool} got no response within {}ms",
                        limit.as_millis()
                    ))),
                }
            }
            Err(e) => ToolResult::err(e),
        };
        self.record(tool, arguments, &result, started.elapsed());
        result
    }

    fn record<T>(&self, tool: &str, arguments: String, result: &ToolResult<T>, elapsed: Duration) {
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let ctx = &self.context;
        match result.error() {
            None => info!(
                run_id = %ctx.run_id(),
                session_id = %ctx.session_id(),
                platform = %self.platform(),
                tool,
                success = true,
                duration_ms,
                "tool call"
            ),
            Some(err) => warn!(
                run_id = %ctx.run_id(),
                session_id = %ctx.session_id(),
                platform = %self.platform(),
                tool,
                success = false,
                duration_ms,
                error_kind = %err.kind,
                error = %err.message,
                "tool call failed"
            ),
        }
        self.telemetry
            .lock()
            .record(tool, arguments, result.error_kind(), elapsed);
    }
}

#[async_trait]
impl ConnectionTools for AppiumTools {
    async fn connect(&mut self, config: &DriverConfig) -> ToolResult<DriverSessionInfo> {
        let started = Instant::now();
        let result = self.open(config).await;
        let args = format!("{} @ {}", config.device_name(), config.server_url());
        self.record("connect", args, &result, started.elapsed());
        result
    }

    async fn disconnect(&mut self) -> ToolResult<()> {
        let started = Instant::now();
        if self.state != ToolState::Disposed {
            self.release().await;
            if self.state == ToolState::Connected {
                self.state = ToolState::Disconnected;
            }
        }
        let result = ToolResult::ok(());
        self.record("disconnect", String::new(), &result, started.elapsed());
        result
    }

    fn is_connected(&self) -> bool {
        self.state == ToolState::Connected && self.backend.tools().is_connected()
    }
}

#[async_trait]
impl DataGatheringTools for AppiumTools {
    async fn screenshot(&self) -> ToolResult<Screenshot> {
        self.run("screenshot", String::new(), self.backend.tools().screenshot())
            .await
    }

    async fn get_page_source(&self) -> ToolResult<String> {
        self.run("get_page_source", String::new(), self.backend.tools().get_page_source())
            .await
    }

    async fn get_element_info(&self, selector: &Selector) -> ToolResult<ElementInfo> {
        self.run(
            "get_element_info",
            selector.to_string(),
            self.backend.tools().get_element_info(selector),
        )
        .await
    }

    async fn find_elements(&self, selector: &Selector) -> ToolResult<Vec<ElementInfo>> {
        self.run(
            "find_elements",
            selector.to_string(),
            self.backend.tools().find_elements(selector),
        )
        .await
    }

    async fn get_app_state(&self) -> ToolResult<AppStateInfo> {
        self.run("get_app_state", String::new(), self.backend.tools().get_app_state())
            .await
    }

    async fn get_network_info(&self) -> ToolResult<NetworkInfo> {
        self.run("get_network_info", String::new(), self.backend.tools().get_network_info())
            .await
    }

    async fn get_logs(&self) -> ToolResult<Vec<LogEntry>> {
        self.run("get_logs", String::new(), self.backend.tools().get_logs())
            .await
    }

    async fn get_screen_size(&self) -> ToolResult<ScreenSize> {
        self.run("get_screen_size", String::new(), self.backend.tools().get_screen_size())
            .await
    }

    async fn get_orientation(&self) -> ToolResult<DeviceOrientation> {
        self.run("get_orientation", String::new(), self.backend.tools().get_orientation())
            .await
    }

    async fn get_platform_info(&self) -> ToolResult<PlatformInfo> {
        self.run("get_platform_info", String::new(), self.backend.tools().get_platform_info())
            .await
    }
}

#[async_trait]
impl ActionTools for AppiumTools {
    async fn tap(&self, selector: &Selector) -> ToolResult<()> {
        self.run("tap", selector.to_string(), self.backend.tools().tap(selector))
            .await
    }

    async fn tap_at(&self, point: Point) -> ToolResult<()> {
        self.run(
            "tap_at",
            format!("({}, {})", point.x, point.y),
            self.backend.tools().tap_at(point),
        )
        .await
    }

    async fn long_press(&self, selector: &Selector, duration_ms: u64) -> ToolResult<()> {
        self.run(
            "long_press",
            format!("{selector} for {duration_ms}ms"),
            self.backend.tools().long_press(selector, duration_ms),
        )
        .await
    }

    async fn swipe(&self, direction: SwipeDirection) -> ToolResult<()> {
        self.run(
            "swipe",
            format!("{direction:?}"),
            self.backend.tools().swipe(direction),
        )
        .await
    }

    async fn scroll(&self, direction: ScrollDirection) -> ToolResult<()> {
        self.run(
            "scroll",
            format!("{direction:?}"),
            self.backend.tools().scroll(direction),
        )
        .await
    }

    async fn perform_gesture(&self, gesture: &TouchGesture) -> ToolResult<()> {
        self.run(
            "perform_gesture",
            gesture.name().to_string(),
            self.backend.tools().perform_gesture(gesture),
        )
        .await
    }

    async fn input_text(&self, selector: &Selector, text: &str) -> ToolResult<()> {
        // Only the length is logged; typed text may be a credential.
        self.run(
            "input_text",
            format!("{selector} ({} chars)", text.chars().count()),
            self.backend.tools().input_text(selector, text),
        )
        .await
    }

    async fn clear_text(&self, selector: &Selector) -> ToolResult<()> {
        self.run(
            "clear_text",
            selector.to_string(),
            self.backend.tools().clear_text(selector),
        )
        .await
    }

    async fn press_back(&self) -> ToolResult<()> {
        self.run("press_back", String::new(), self.backend.tools().press_back())
            .await
    }

    async fn hide_keyboard(&self) -> ToolResult<()> {
        self.run("hide_keyboard", String::new(), self.backend.tools().hide_keyboard())
            .await
    }

    async fn launch_app(&self, app_id: &str) -> ToolResult<()> {
        self.run(
            "launch_app",
            app_id.to_string(),
            self.backend.tools().launch_app(app_id),
        )
        .await
    }

    async fn terminate_app(&self, app_id: &str) -> ToolResult<bool> {
        self.run(
            "terminate_app",
            app_id.to_string(),
            self.backend.tools().terminate_app(app_id),
        )
        .await
    }

    async fn grant_permission(&self, app_id: &str, permission: SystemPermission) -> ToolResult<()> {
        self.run(
            "grant_permission",
            format!("{app_id} {permission:?}"),
            self.backend.tools().grant_permission(app_id, permission),
        )
        .await
    }

    async fn revoke_permission(
        &self,
        app_id: &str,
        permission: SystemPermission,
    ) -> ToolResult<()> {
        self.run(
            "revoke_permission",
            format!("{app_id} {permission:?}"),
            self.backend.tools().revoke_permission(app_id, permission),
        )
        .await
    }

    async fn open_deep_link(&self, link: &DeepLinkInfo) -> ToolResult<()> {
        self.run(
            "open_deep_link",
            link.url.clone(),
            self.backend.tools().open_deep_link(link),
        )
        .await
    }

    async fn set_orientation(&self, orientation: DeviceOrientation) -> ToolResult<()> {
        self.run(
            "set_orientation",
            orientation.as_str().to_string(),
            self.backend.tools().set_orientation(orientation),
        )
        .await
    }
}
