//! Android backend over Appium's UiAutomator2 driver.
//!
//! Device-specific features go through Appium's `mobile:` script extensions
//! (`activateApp`, `changePermissions`, `getConnectivity`, ...), everything
//! else through plain W3C WebDriver endpoints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

use screengraph_core::{
    AppInfo, AppState, Bounds, DeepLinkInfo, DeviceOrientation, DriverConfig, Platform,
    PlatformInfo, Point, ScreenSize, ScrollDirection, Selector, SwipeDirection, SystemPermission,
    ToolError, ToolResult, TouchGesture,
};

use crate::actions::ActionTools;
use crate::connection::{ConnectionTools, DriverSessionInfo};
use crate::data_gathering::{
    AppStateInfo, DataGatheringTools, ElementInfo, LogEntry, NetworkInfo, Screenshot,
};
use crate::driver::{AppiumDriver, DriverCommand, DriverError, HttpDriver, HttpMethod};
use crate::protocol;

const SWIPE_DURATION_MS: u64 = 300;
const SCROLL_DURATION_MS: u64 = 500;
/// Fraction of the screen a swipe leaves untouched at each edge.
const SWIPE_MARGIN: f64 = 0.2;
/// Scrolls travel a shorter path so one call moves about one page.
const SCROLL_MARGIN: f64 = 0.3;

struct ActiveSession {
    driver: Arc<dyn AppiumDriver>,
    session_id: String,
    /// Screen size and orientation change on rotation and are refreshed in
    /// place.
    info: RwLock<DriverSessionInfo>,
    /// Package the session was opened for, if any.
    app_package: Option<String>,
}

/// A session the server created but `connect` has not finished setting up.
/// Released by `disconnect` or drop if `connect` is abandoned midway.
struct PendingSession {
    driver: Arc<dyn AppiumDriver>,
    session_id: String,
}

/// Full Android implementation of the three capability contracts.
pub struct AndroidAppiumTools {
    /// Injected driver handle. `None` means an [`HttpDriver`] is built from
    /// the config at connect time.
    injected: Option<Arc<dyn AppiumDriver>>,
    session: Option<ActiveSession>,
    pending: Option<PendingSession>,
}

impl Default for AndroidAppiumTools {
    fn default() -> Self {
        Self::new()
    }
}

impl AndroidAppiumTools {
    pub fn new() -> Self {
        Self {
            injected: None,
            session: None,
            pending: None,
        }
    }

    /// Use `driver` for every session instead of connecting over HTTP.
    pub fn with_driver(driver: Arc<dyn AppiumDriver>) -> Self {
        Self {
            injected: Some(driver),
            session: None,
            pending: None,
        }
    }

    /// A snapshot of the live session, reflecting the latest rotation.
    pub fn session_info(&self) -> Option<DriverSessionInfo> {
        self.session.as_ref().map(|s| s.info.read().clone())
    }

    fn active(&self) -> Result<&ActiveSession, ToolError> {
        self.session.as_ref().ok_or_else(|| {
            ToolError::session_not_found("no active Android session; call connect first")
        })
    }

    /// Send a command scoped to the active session.
    async fn command(
        &self,
        operation: &str,
        method: HttpMethod,
        suffix: &str,
        body: Option<Value>,
    ) -> Result<Value, ToolError> {
        let session = self.active()?;
        let cmd = DriverCommand {
            method,
            path: format!("/session/{}{}", session.session_id, suffix),
            body,
        };
        session
            .driver
            .send(cmd)
            .await
            .map_err(|e| e.into_tool_error(operation))
    }

    async fn get(&self, operation: &str, suffix: &str) -> Result<Value, ToolError> {
        self.command(operation, HttpMethod::Get, suffix, None)
            .await
    }

    async fn post(&self, operation: &str, suffix: &str, body: Value) -> Result<Value, ToolError> {
        self.command(operation, HttpMethod::Post, suffix, Some(body))
            .await
    }

    /// Run an Appium `mobile:` extension script.
    async fn mobile(&self, operation: &str, script: &str, args: Value) -> Result<Value, ToolError> {
        self.post(
            operation,
            "/execute/sync",
            json!({"script": format!("mobile: {script}"), "args": [args]}),
        )
        .await
    }

    fn screen(&self) -> Result<ScreenSize, ToolError> {
        Ok(self.active()?.info.read().screen_size)
    }

    /// Re-read screen size and orientation into the session info.
    async fn refresh_geometry(&self, operation: &str) -> Result<(), ToolError> {
        let rect = self.get(operation, "/window/rect").await?;
        let orientation = self.get(operation, "/orientation").await?;
        let screen_size = protocol::screen_size(&rect).map_err(|e| e.into_tool_error(operation))?;
        let orientation =
            protocol::orientation(&orientation).map_err(|e| e.into_tool_error(operation))?;

        let mut info = self.active()?.info.write();
        info.screen_size = screen_size;
        info.orientation = orientation;
        debug!(?orientation, ?screen_size, "session geometry refreshed");
        Ok(())
    }

    // ── Element resolution ─────────────────────────────────────

    async fn find_element(
        &self,
        operation: &str,
        selector: &Selector,
    ) -> Result<String, ToolError> {
        let (using, value) = protocol::locator(selector, Platform::Android)?;
        let found = self
            .post(operation, "/element", json!({"using": using, "value": value}))
            .await
            .map_err(|e| not_found_for(e, selector))?;
        protocol::element_id(&found).map_err(|e| e.into_tool_error(operation))
    }

    async fn element_rect(&self, operation: &str, element: &str) -> Result<Bounds, ToolError> {
        let rect = self
            .get(operation, &format!("/element/{element}/rect"))
            .await?;
        protocol::bounds(&rect).map_err(|e| e.into_tool_error(operation))
    }

    /// Resolve an element and require its bounds to overlap the screen.
    async fn on_screen_element(
        &self,
        operation: &str,
        selector: &Selector,
    ) -> Result<(String, Bounds), ToolError> {
        let element = self.find_element(operation, selector).await?;
        let bounds = self.element_rect(operation, &element).await?;
        let screen = self.screen()?;
        if bounds.is_empty() || !bounds.intersects(&screen.as_bounds()) {
            return Err(ToolError::element_not_found(format!(
                "element {selector} at {bounds:?} is outside the {}x{} screen",
                screen.width, screen.height
            )));
        }
        Ok((element, bounds))
    }

    async fn describe(
        &self,
        operation: &str,
        selector: &Selector,
        element: String,
    ) -> Result<ElementInfo, ToolError> {
        let bounds = self.element_rect(operation, &element).await?;
        let text = self
            .get(operation, &format!("/element/{element}/text"))
            .await?;
        let enabled = self
            .get(operation, &format!("/element/{element}/enabled"))
            .await?;
        let displayed = self
            .get(operation, &format!("/element/{element}/displayed"))
            .await?;
        let class_name = self
            .get(operation, &format!("/element/{element}/attribute/className"))
            .await?;

        Ok(ElementInfo {
            element_id: element,
            selector: selector.clone(),
            text: non_empty(&text),
            class_name: non_empty(&class_name),
            bounds,
            enabled: truthy(&enabled),
            displayed: truthy(&displayed),
        })
    }

    // ── Gestures ───────────────────────────────────────────────

    fn check_points(&self, points: &[Point]) -> Result<(), ToolError> {
        let screen = self.screen()?;
        match points.iter().find(|p| !screen.contains(**p)) {
            Some(p) => Err(ToolError::element_not_found(format!(
                "point ({}, {}) is outside the {}x{} screen",
                p.x, p.y, screen.width, screen.height
            ))),
            None => Ok(()),
        }
    }

    async fn gesture(&self, operation: &str, gesture: &TouchGesture) -> Result<(), ToolError> {
        self.check_points(&gesture.points())?;
        debug!(gesture = gesture.name(), "performing gesture");
        self.post(operation, "/actions", protocol::pointer_actions(gesture))
            .await?;
        Ok(())
    }

    fn directional_stroke(
        &self,
        direction: SwipeDirection,
        margin: f64,
        duration_ms: u64,
    ) -> Result<TouchGesture, ToolError> {
        let screen = self.screen()?;
        let (w, h) = (f64::from(screen.width), f64::from(screen.height));
        let center = screen.center();
        let near = |len: f64| (len * margin) as i32;
        let far = |len: f64| (len * (1.0 - margin)) as i32;

        let (from, to) = match direction {
            SwipeDirection::Up => (Point::new(center.x, far(h)), Point::new(center.x, near(h))),
            SwipeDirection::Down => (Point::new(center.x, near(h)), Point::new(center.x, far(h))),
            SwipeDirection::Left => (Point::new(far(w), center.y), Point::new(near(w), center.y)),
            SwipeDirection::Right => (Point::new(near(w), center.y), Point::new(far(w), center.y)),
        };
        Ok(TouchGesture::Swipe {
            from,
            to,
            duration_ms,
        })
    }

    async fn change_permission(
        &self,
        operation: &str,
        app_id: &str,
        permission: SystemPermission,
        action: &str,
    ) -> Result<(), ToolError> {
        self.mobile(
            operation,
            "changePermissions",
            json!({
                "permissions": [permission.android_name()],
                "appPackage": app_id,
                "action": action,
            }),
        )
        .await?;
        Ok(())
    }

    // ── Connect internals ──────────────────────────────────────

    fn driver_for(&self, config: &DriverConfig) -> Result<Arc<dyn AppiumDriver>, ToolError> {
        if let Some(driver) = &self.injected {
            return Ok(Arc::clone(driver));
        }
        let driver = HttpDriver::new(config.server_url(), config.command_timeout())
            .map_err(|e| e.into_tool_error("connect"))?;
        Ok(Arc::new(driver))
    }

    /// Everything after session creation. Any failure here must be followed
    /// by deleting the half-open session.
    async fn probe_session(
        driver: &dyn AppiumDriver,
        session_id: &str,
        config: &DriverConfig,
    ) -> Result<(ScreenSize, DeviceOrientation), DriverError> {
        let implicit_ms = u64::try_from(config.implicit_wait().as_millis()).unwrap_or(u64::MAX);
        driver
            .send(DriverCommand::post(
                format!("/session/{session_id}/timeouts"),
                json!({"implicit": implicit_ms}),
            ))
            .await?;
        let rect = driver
            .send(DriverCommand::get(format!("/session/{session_id}/window/rect")))
            .await?;
        let orientation = driver
            .send(DriverCommand::get(format!("/session/{session_id}/orientation")))
            .await?;
        Ok((protocol::screen_size(&rect)?, protocol::orientation(&orientation)?))
    }
}

/// A lookup that the server reports as failing for a missing element keeps
/// the selector in the message.
fn not_found_for(err: ToolError, selector: &Selector) -> ToolError {
    if err.kind == screengraph_core::ToolErrorType::ElementNotFound {
        ToolError::element_not_found(format!("no element matches {selector}"))
            .with_cause(err)
    } else {
        err
    }
}

fn non_empty(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn flag(value: &Value, key: &str) -> Option<bool> {
    value.get(key).and_then(Value::as_bool)
}

fn unit(result: Result<Value, ToolError>) -> ToolResult<()> {
    result.map(|_| ()).into()
}

#[async_trait]
impl ConnectionTools for AndroidAppiumTools {
    async fn connect(&mut self, config: &DriverConfig) -> ToolResult<DriverSessionInfo> {
        if self.session.is_some() {
            return ToolResult::err(ToolError::connection_failed(
                "already connected; disconnect before opening a new session",
            ));
        }
        if config.platform() != Platform::Android {
            return ToolResult::err(ToolError::invalid_configuration(format!(
                "Android backend cannot connect with a {} configuration",
                config.platform()
            )));
        }

        let driver = match self.driver_for(config) {
            Ok(d) => d,
            Err(e) => return ToolResult::err(e),
        };

        let created = match driver
            .send(DriverCommand::post("/session", protocol::session_capabilities(config)))
            .await
        {
            Ok(v) => v,
            Err(e) => {
                return ToolResult::err(
                    ToolError::connection_failed(format!(
                        "could not open a session on {}: {e}",
                        config.server_url()
                    ))
                    .with_cause(e),
                );
            }
        };

        let Some(session_id) = created
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            return ToolResult::err(ToolError::connection_failed(
                "server response carried no sessionId",
            ));
        };

        self.pending = Some(PendingSession {
            driver: Arc::clone(&driver),
            session_id: session_id.clone(),
        });

        let (screen_size, orientation) =
            match Self::probe_session(driver.as_ref(), &session_id, config).await {
                Ok(v) => v,
                Err(e) => {
                    if let Some(pending) = self.pending.take() {
                        release(pending.driver.as_ref(), &pending.session_id).await;
                    }
                    return ToolResult::err(
                        ToolError::connection_failed(format!("session setup failed: {e}"))
                            .with_cause(e),
                    );
                }
            };

        let caps = created.get("capabilities").cloned().unwrap_or(Value::Null);
        let cap_str = |key: &str| {
            caps.get(key)
                .or_else(|| caps.get(format!("appium:{key}").as_str()))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let info = DriverSessionInfo {
            session_id: session_id.clone(),
            connected_at: Utc::now(),
            orientation,
            screen_size,
            platform_info: PlatformInfo {
                platform: Platform::Android,
                platform_version: cap_str("platformVersion")
                    .unwrap_or_else(|| config.platform_version().to_string()),
                device_name: cap_str("deviceName")
                    .unwrap_or_else(|| config.device_name().to_string()),
                automation_name: Platform::Android.automation_name().to_string(),
                device_model: cap_str("deviceModel"),
            },
        };

        info!(%session_id, device = %info.platform_info.device_name, "Android session opened");
        self.pending = None;
        self.session = Some(ActiveSession {
            driver,
            session_id,
            info: RwLock::new(info.clone()),
            app_package: config.app_id().map(str::to_string),
        });
        ToolResult::ok(info)
    }

    async fn disconnect(&mut self) -> ToolResult<()> {
        if let Some(pending) = self.pending.take() {
            release(pending.driver.as_ref(), &pending.session_id).await;
        }
        if let Some(session) = self.session.take()
            && release(session.driver.as_ref(), &session.session_id).await
        {
            info!(session_id = %session.session_id, "Android session closed");
        }
        ToolResult::ok(())
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }
}

#[async_trait]
impl DataGatheringTools for AndroidAppiumTools {
    async fn screenshot(&self) -> ToolResult<Screenshot> {
        let result = self.get("screenshot", "/screenshot").await.and_then(|v| {
            v.as_str()
                .map(|s| Screenshot::from_base64(s.to_string()))
                .ok_or_else(|| {
                    DriverError::InvalidResponse("screenshot is not a string".into())
                        .into_tool_error("screenshot")
                })
        });
        result.into()
    }

    async fn get_page_source(&self) -> ToolResult<String> {
        let result = self.get("get_page_source", "/source").await.and_then(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                DriverError::InvalidResponse("page source is not a string".into())
                    .into_tool_error("get_page_source")
            })
        });
        result.into()
    }

    async fn get_element_info(&self, selector: &Selector) -> ToolResult<ElementInfo> {
        let op = "get_element_info";
        let result = async {
            let element = self.find_element(op, selector).await?;
            self.describe(op, selector, element).await
        }
        .await;
        result.into()
    }

    async fn find_elements(&self, selector: &Selector) -> ToolResult<Vec<ElementInfo>> {
        let op = "find_elements";
        let result = async {
            let (using, value) = protocol::locator(selector, Platform::Android)?;
            let found = self
                .post(op, "/elements", json!({"using": using, "value": value}))
                .await?;
            let refs = found.as_array().cloned().unwrap_or_default();
            let mut elements = Vec::with_capacity(refs.len());
            for r in &refs {
                let id = protocol::element_id(r).map_err(|e| e.into_tool_error(op))?;
                elements.push(self.describe(op, selector, id).await?);
            }
            Ok::<_, ToolError>(elements)
        }
        .await;
        result.into()
    }

    async fn get_app_state(&self) -> ToolResult<AppStateInfo> {
        let op = "get_app_state";
        let result = async {
            let session = self.active()?;
            let package = self.mobile(op, "getCurrentPackage", json!({})).await?;
            let activity = self.mobile(op, "getCurrentActivity", json!({})).await?;
            let foreground_app = non_empty(&package);

            let app_id = session
                .app_package
                .clone()
                .or_else(|| foreground_app.clone())
                .ok_or_else(|| ToolError::driver_error("no target app and no foreground package"))?;

            let code = self
                .mobile(op, "queryAppState", json!({"appId": app_id}))
                .await?;
            let state = code.as_i64().map(AppState::from_code).unwrap_or(AppState::Unknown);

            Ok::<_, ToolError>(AppStateInfo {
                app: AppInfo { app_id, state },
                foreground_app,
                current_activity: non_empty(&activity),
            })
        }
        .await;
        result.into()
    }

    async fn get_network_info(&self) -> ToolResult<NetworkInfo> {
        let result = self
            .mobile("get_network_info", "getConnectivity", json!({}))
            .await
            .map(|v| NetworkInfo {
                wifi_enabled: flag(&v, "wifi"),
                mobile_data_enabled: flag(&v, "data"),
                airplane_mode: flag(&v, "airplaneMode"),
            });
        result.into()
    }

    async fn get_logs(&self) -> ToolResult<Vec<LogEntry>> {
        let result = self
            .post("get_logs", "/se/log", json!({"type": "logcat"}))
            .await
            .map(|v| {
                v.as_array()
                    .map(|lines| {
                        lines
                            .iter()
                            .map(|line| LogEntry {
                                timestamp: line
                                    .get("timestamp")
                                    .and_then(Value::as_i64)
                                    .and_then(DateTime::<Utc>::from_timestamp_millis),
                                level: line
                                    .get("level")
                                    .and_then(Value::as_str)
                                    .unwrap_or("ALL")
                                    .to_string(),
                                message: line
                                    .get("message")
                                    .and_then(Value::as_str)
                                    .unwrap_or_default()
                                    .to_string(),
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            });
        result.into()
    }

    async fn get_screen_size(&self) -> ToolResult<ScreenSize> {
        let op = "get_screen_size";
        let result = async {
            let rect = self.get(op, "/window/rect").await?;
            let size = protocol::screen_size(&rect).map_err(|e| e.into_tool_error(op))?;
            self.active()?.info.write().screen_size = size;
            Ok::<_, ToolError>(size)
        }
        .await;
        result.into()
    }

    async fn get_orientation(&self) -> ToolResult<DeviceOrientation> {
        let op = "get_orientation";
        let result = async {
            let value = self.get(op, "/orientation").await?;
            let orientation = protocol::orientation(&value).map_err(|e| e.into_tool_error(op))?;
            self.active()?.info.write().orientation = orientation;
            Ok::<_, ToolError>(orientation)
        }
        .await;
        result.into()
    }

    async fn get_platform_info(&self) -> ToolResult<PlatformInfo> {
        self.active().map(|s| s.info.read().platform_info.clone()).into()
    }
}

#[async_trait]
impl ActionTools for AndroidAppiumTools {
    async fn tap(&self, selector: &Selector) -> ToolResult<()> {
        let result = async {
            let (element, _) = self.on_screen_element("tap", selector).await?;
            self.post("tap", &format!("/element/{element}/click"), json!({}))
                .await
        }
        .await;
        unit(result)
    }

    async fn tap_at(&self, point: Point) -> ToolResult<()> {
        self.gesture("tap_at", &TouchGesture::Tap { at: point })
            .await
            .into()
    }

    async fn long_press(&self, selector: &Selector, duration_ms: u64) -> ToolResult<()> {
        let result = async {
            let (_, bounds) = self.on_screen_element("long_press", selector).await?;
            let screen = self.screen()?;
            // Press the visible part of the element, not a clipped-off center.
            let at = clamp_to_screen(bounds.center(), screen);
            self.gesture("long_press", &TouchGesture::LongPress { at, duration_ms })
                .await
        }
        .await;
        result.into()
    }

    async fn swipe(&self, direction: SwipeDirection) -> ToolResult<()> {
        let result = async {
            let gesture = self.directional_stroke(direction, SWIPE_MARGIN, SWIPE_DURATION_MS)?;
            self.gesture("swipe", &gesture).await
        }
        .await;
        result.into()
    }

    async fn scroll(&self, direction: ScrollDirection) -> ToolResult<()> {
        let result = async {
            let gesture =
                self.directional_stroke(direction.as_swipe(), SCROLL_MARGIN, SCROLL_DURATION_MS)?;
            self.gesture("scroll", &gesture).await
        }
        .await;
        result.into()
    }

    async fn perform_gesture(&self, gesture: &TouchGesture) -> ToolResult<()> {
        self.gesture("perform_gesture", gesture).await.into()
    }

    async fn input_text(&self, selector: &Selector, text: &str) -> ToolResult<()> {
        let result = async {
            let (element, _) = self.on_screen_element("input_text", selector).await?;
            self.post(
                "input_text",
                &format!("/element/{element}/value"),
                json!({"text": text}),
            )
            .await
        }
        .await;
        unit(result)
    }

    async fn clear_text(&self, selector: &Selector) -> ToolResult<()> {
        let result = async {
            let (element, _) = self.on_screen_element("clear_text", selector).await?;
            self.post("clear_text", &format!("/element/{element}/clear"), json!({}))
                .await
        }
        .await;
        unit(result)
    }

    async fn press_back(&self) -> ToolResult<()> {
        unit(self.post("press_back", "/back", json!({})).await)
    }

    async fn hide_keyboard(&self) -> ToolResult<()> {
        unit(self.mobile("hide_keyboard", "hideKeyboard", json!({})).await)
    }

    async fn launch_app(&self, app_id: &str) -> ToolResult<()> {
        unit(
            self.mobile("launch_app", "activateApp", json!({"appId": app_id}))
                .await,
        )
    }

    async fn terminate_app(&self, app_id: &str) -> ToolResult<bool> {
        self.mobile("terminate_app", "terminateApp", json!({"appId": app_id}))
            .await
            .map(|v| v.as_bool().unwrap_or(false))
            .into()
    }

    async fn grant_permission(&self, app_id: &str, permission: SystemPermission) -> ToolResult<()> {
        self.change_permission("grant_permission", app_id, permission, "grant")
            .await
            .into()
    }

    async fn revoke_permission(
        &self,
        app_id: &str,
        permission: SystemPermission,
    ) -> ToolResult<()> {
        self.change_permission("revoke_permission", app_id, permission, "revoke")
            .await
            .into()
    }

    async fn open_deep_link(&self, link: &DeepLinkInfo) -> ToolResult<()> {
        let result = async {
            let session = self.active()?;
            let mut args = json!({"url": link.url});
            if let Some(pkg) = link.app_id.as_ref().or(session.app_package.as_ref()) {
                args["package"] = json!(pkg);
            }
            self.mobile("open_deep_link", "deepLink", args).await
        }
        .await;
        unit(result)
    }

    async fn set_orientation(&self, orientation: DeviceOrientation) -> ToolResult<()> {
        let op = "set_orientation";
        let result = async {
            self.post(op, "/orientation", json!({"orientation": orientation.as_str()}))
                .await?;
            // Later bounds checks and swipe geometry must see the rotated screen.
            self.refresh_geometry(op).await
        }
        .await;
        result.into()
    }
}

fn clamp_to_screen(p: Point, screen: ScreenSize) -> Point {
    let max_x = i32::try_from(screen.width.saturating_sub(1)).unwrap_or(i32::MAX);
    let max_y = i32::try_from(screen.height.saturating_sub(1)).unwrap_or(i32::MAX);
    Point::new(p.x.clamp(0, max_x), p.y.clamp(0, max_y))
}

/// Delete a server session. Returns whether the delete succeeded; a failure
/// is logged and the handle is considered released either way.
async fn release(driver: &dyn AppiumDriver, session_id: &str) -> bool {
    match driver
        .send(DriverCommand::delete(format!("/session/{session_id}")))
        .await
    {
        Ok(_) => true,
        Err(e) => {
            warn!(%session_id, error = %e, "session delete failed; handle released");
            false
        }
    }
}

impl Drop for AndroidAppiumTools {
    fn drop(&mut self) {
        let owned = self
            .session
            .take()
            .map(|s| (s.driver, s.session_id))
            .into_iter()
            .chain(self.pending.take().map(|p| (p.driver, p.session_id)));

        for (driver, sid) in owned {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    debug!(session_id = %sid, "releasing session on drop");
                    handle.spawn(async move {
                        release(driver.as_ref(), &sid).await;
                    });
                }
                Err(_) => {
                    warn!(
                        session_id = %sid,
                        "dropped outside a runtime; server will reap the session"
                    );
                }
            }
        }
    }
}
