use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tool::ToolError;

// ─── Platform ───────────────────────────────────────────────────

/// Mobile platforms the automation layer can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// The closed set of supported platforms, in display order.
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    /// Value of the W3C `platformName` capability.
    pub fn capability_name(&self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
        }
    }

    /// Appium automation driver used for this platform.
    pub fn automation_name(&self) -> &'static str {
        match self {
            Platform::Android => "UiAutomator2",
            Platform::Ios => "XCUITest",
        }
    }

    /// Comma-separated list of supported platform names, for error messages.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(ToolError::unsupported_platform(format!(
                "unsupported platform '{other}'; supported platforms: {}",
                Platform::supported_list()
            ))),
        }
    }
}

/// Identity of the device and driver behind a live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub platform: Platform,
    pub platform_version: String,
    pub device_name: String,
    pub automation_name: String,
    /// Device model reported by the driver, when available.
    #[serde(default)]
    pub device_model: Option<String>,
}

// ─── Geometry ───────────────────────────────────────────────────

/// A point in screen coordinates (pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Device screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && i64::from(point.x) < i64::from(self.width)
            && i64::from(point.y) < i64::from(self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(half(self.width), half(self.height))
    }

    pub fn as_bounds(&self) -> Bounds {
        Bounds {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }
}

fn half(v: u32) -> i32 {
    i32::try_from(v / 2).unwrap_or(i32::MAX)
}

/// Axis-aligned rectangle occupied by an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add(half(self.width)),
            self.y.saturating_add(half(self.height)),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        let (px, py) = (i64::from(point.x), i64::from(point.y));
        px >= i64::from(self.x)
            && px < self.right()
            && py >= i64::from(self.y)
            && py < self.bottom()
    }

    /// True when the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Bounds) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        i64::from(self.x) < other.right()
            && i64::from(other.x) < self.right()
            && i64::from(self.y) < other.bottom()
            && i64::from(other.y) < self.bottom()
    }
}

/// Physical orientation of the device screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceOrientation {
    Portrait,
    Landscape,
}

impl DeviceOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceOrientation::Portrait => "PORTRAIT",
            DeviceOrientation::Landscape => "LANDSCAPE",
        }
    }
}

// ─── Selectors ──────────────────────────────────────────────────

/// Strategy used to locate an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorType {
    Id,
    Xpath,
    AccessibilityId,
    ClassName,
    /// Exact visible text of the element.
    Text,
    AndroidUiautomator,
    IosPredicate,
    IosClassChain,
}

impl SelectorType {
    /// Whether the strategy can be resolved on the given platform.
    pub fn supported_on(&self, platform: Platform) -> bool {
        match self {
            SelectorType::AndroidUiautomator => platform == Platform::Android,
            SelectorType::IosPredicate | SelectorType::IosClassChain => platform == Platform::Ios,
            _ => true,
        }
    }
}

impl fmt::Display for SelectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectorType::Id => "id",
            SelectorType::Xpath => "xpath",
            SelectorType::AccessibilityId => "accessibility_id",
            SelectorType::ClassName => "class_name",
            SelectorType::Text => "text",
            SelectorType::AndroidUiautomator => "android_uiautomator",
            SelectorType::IosPredicate => "ios_predicate",
            SelectorType::IosClassChain => "ios_class_chain",
        };
        f.write_str(name)
    }
}

/// A selector strategy paired with its query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub kind: SelectorType,
    pub value: String,
}

impl Selector {
    pub fn new(kind: SelectorType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(SelectorType::Id, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(SelectorType::Xpath, value)
    }

    pub fn accessibility_id(value: impl Into<String>) -> Self {
        Self::new(SelectorType::AccessibilityId, value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new(SelectorType::ClassName, value)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(SelectorType::Text, value)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.value)
    }
}

// ─── Gestures ───────────────────────────────────────────────────

/// Direction the finger travels during a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Direction the content moves during a scroll.
///
/// Scrolling `Down` reveals content below, so the finger travels up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    /// The finger movement that produces this scroll.
    pub fn as_swipe(&self) -> SwipeDirection {
        match self {
            ScrollDirection::Down => SwipeDirection::Up,
            ScrollDirection::Up => SwipeDirection::Down,
            ScrollDirection::Right => SwipeDirection::Left,
            ScrollDirection::Left => SwipeDirection::Right,
        }
    }
}

/// A raw pointer gesture at explicit coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TouchGesture {
    Tap { at: Point },
    DoubleTap { at: Point },
    LongPress { at: Point, duration_ms: u64 },
    Swipe { from: Point, to: Point, duration_ms: u64 },
    Drag { from: Point, to: Point, duration_ms: u64 },
}

impl TouchGesture {
    /// Every coordinate the gesture touches.
    pub fn points(&self) -> Vec<Point> {
        match *self {
            TouchGesture::Tap { at }
            | TouchGesture::DoubleTap { at }
            | TouchGesture::LongPress { at, .. } => vec![at],
            TouchGesture::Swipe { from, to, .. } | TouchGesture::Drag { from, to, .. } => {
                vec![from, to]
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TouchGesture::Tap { .. } => "tap",
            TouchGesture::DoubleTap { .. } => "double_tap",
            TouchGesture::LongPress { .. } => "long_press",
            TouchGesture::Swipe { .. } => "swipe",
            TouchGesture::Drag { .. } => "drag",
        }
    }
}

// ─── Apps & permissions ─────────────────────────────────────────

/// Runtime permission an app can be granted or denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPermission {
    Camera,
    Microphone,
    Location,
    Contacts,
    Calendar,
    Storage,
    Notifications,
    Phone,
}

impl SystemPermission {
    /// Fully qualified Android manifest permission name.
    pub fn android_name(&self) -> &'static str {
        match self {
            SystemPermission::Camera => "android.permission.CAMERA",
            SystemPermission::Microphone => "android.permission.RECORD_AUDIO",
            SystemPermission::Location => "android.permission.ACCESS_FINE_LOCATION",
            SystemPermission::Contacts => "android.permission.READ_CONTACTS",
            SystemPermission::Calendar => "android.permission.READ_CALENDAR",
            SystemPermission::Storage => "android.permission.READ_EXTERNAL_STORAGE",
            SystemPermission::Notifications => "android.permission.POST_NOTIFICATIONS",
            SystemPermission::Phone => "android.permission.CALL_PHONE",
        }
    }
}

/// Lifecycle state of an application as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    NotInstalled,
    NotRunning,
    RunningInBackgroundSuspended,
    RunningInBackground,
    RunningInForeground,
    Unknown,
}

impl AppState {
    /// Decode the numeric state returned by `mobile: queryAppState`.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => AppState::NotInstalled,
            1 => AppState::NotRunning,
            2 => AppState::RunningInBackgroundSuspended,
            3 => AppState::RunningInBackground,
            4 => AppState::RunningInForeground,
            _ => AppState::Unknown,
        }
    }
}

/// An installed application and its current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Android package name or iOS bundle id.
    pub app_id: String,
    pub state: AppState,
}

/// A deep link to open, optionally scoped to one app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepLinkInfo {
    pub url: String,
    /// Android package / iOS bundle id that should handle the link.
    #[serde(default)]
    pub app_id: Option<String>,
}

impl DeepLinkInfo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            app_id: None,
        }
    }

    pub fn for_app(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }
}
