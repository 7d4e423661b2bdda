//! W3C WebDriver / Appium payload helpers shared by the backends.

use serde_json::{Value, json};

use screengraph_core::{
    Bounds, DeviceOrientation, DriverConfig, Platform, Point, ScreenSize, Selector, SelectorType,
    ToolError, TouchGesture,
};

use crate::driver::DriverError;

/// JSON key holding an element reference in W3C responses.
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

const TAP_HOLD_MS: u64 = 50;
const DOUBLE_TAP_GAP_MS: u64 = 100;
const DRAG_PICKUP_MS: u64 = 500;

/// `POST /session` body for the given connection parameters.
pub fn session_capabilities(config: &DriverConfig) -> Value {
    let platform = config.platform();
    let mut caps = serde_json::Map::new();
    caps.insert("platformName".into(), json!(platform.capability_name()));
    caps.insert("appium:automationName".into(), json!(platform.automation_name()));
    caps.insert("appium:deviceName".into(), json!(config.device_name()));
    caps.insert("appium:platformVersion".into(), json!(config.platform_version()));
    caps.insert(
        "appium:newCommandTimeout".into(),
        json!(config.new_command_timeout().as_secs()),
    );

    match config.identity() {
        screengraph_core::AppIdentity::Android {
            app_package,
            app_activity,
        } => {
            if let Some(pkg) = app_package {
                caps.insert("appium:appPackage".into(), json!(pkg));
            }
            if let Some(act) = app_activity {
                caps.insert("appium:appActivity".into(), json!(act));
            }
        }
        screengraph_core::AppIdentity::Ios { bundle_id } => {
            if let Some(id) = bundle_id {
                caps.insert("appium:bundleId".into(), json!(id));
            }
        }
    }

    json!({
        "capabilities": {
            "alwaysMatch": Value::Object(caps),
            "firstMatch": [{}],
        }
    })
}

// ─── Selectors ──────────────────────────────────────────────────

/// Translate a selector into the W3C `(using, value)` locator pair.
///
/// Platform-specific strategies are rejected on the other platform with
/// `UNSUPPORTED_PLATFORM`.
pub fn locator(
    selector: &Selector,
    platform: Platform,
) -> Result<(&'static str, String), ToolError> {
    if !selector.kind.supported_on(platform) {
        return Err(ToolError::unsupported_platform(format!(
            "selector strategy '{}' is not available on {platform}",
            selector.kind
        )));
    }
    let pair = match selector.kind {
        SelectorType::Id => ("id", selector.value.clone()),
        SelectorType::Xpath => ("xpath", selector.value.clone()),
        SelectorType::AccessibilityId => ("accessibility id", selector.value.clone()),
        SelectorType::ClassName => ("class name", selector.value.clone()),
        SelectorType::Text => {
            let attr = match platform {
                Platform::Android => "text",
                Platform::Ios => "label",
            };
            ("xpath", format!("//*[@{attr}={}]", xpath_literal(&selector.value)))
        }
        SelectorType::AndroidUiautomator => ("-android uiautomator", selector.value.clone()),
        SelectorType::IosPredicate => ("-ios predicate string", selector.value.clone()),
        SelectorType::IosClassChain => ("-ios class chain", selector.value.clone()),
    };
    Ok(pair)
}

/// Quote a string for use inside an XPath expression.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

// ─── Response parsing ───────────────────────────────────────────

/// Extract the element id from a find-element response.
pub fn element_id(value: &Value) -> Result<String, DriverError> {
    value
        .get(W3C_ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DriverError::InvalidResponse(format!("no element reference in {value}")))
}

fn number(value: &Value, key: &str) -> Result<f64, DriverError> {
    value
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| DriverError::InvalidResponse(format!("missing numeric '{key}' in {value}")))
}

/// Parse a `{x, y, width, height}` rect.
pub fn bounds(value: &Value) -> Result<Bounds, DriverError> {
    Ok(Bounds::new(
        number(value, "x")?.round() as i32,
        number(value, "y")?.round() as i32,
        number(value, "width")?.max(0.0).round() as u32,
        number(value, "height")?.max(0.0).round() as u32,
    ))
}

pub fn screen_size(value: &Value) -> Result<ScreenSize, DriverError> {
    let rect = bounds(value)?;
    Ok(ScreenSize::new(rect.width, rect.height))
}

pub fn orientation(value: &Value) -> Result<DeviceOrientation, DriverError> {
    match value.as_str().map(str::to_ascii_uppercase).as_deref() {
        Some("PORTRAIT") => Ok(DeviceOrientation::Portrait),
        Some("LANDSCAPE") => Ok(DeviceOrientation::Landscape),
        _ => Err(DriverError::InvalidResponse(format!(
            "unknown orientation {value}"
        ))),
    }
}

// ─── Pointer actions ────────────────────────────────────────────

fn pointer_move(at: Point, duration_ms: u64) -> Value {
    json!({
        "type": "pointerMove",
        "duration": duration_ms,
        "origin": "viewport",
        "x": at.x,
        "y": at.y,
    })
}

fn pause(duration_ms: u64) -> Value {
    json!({"type": "pause", "duration": duration_ms})
}

fn press_release(at: Point, hold_ms: u64) -> Vec<Value> {
    vec![
        pointer_move(at, 0),
        json!({"type": "pointerDown", "button": 0}),
        pause(hold_ms),
        json!({"type": "pointerUp", "button": 0}),
    ]
}

fn stroke(from: Point, to: Point, pickup_ms: u64, duration_ms: u64) -> Vec<Value> {
    vec![
        pointer_move(from, 0),
        json!({"type": "pointerDown", "button": 0}),
        pause(pickup_ms),
        pointer_move(to, duration_ms),
        json!({"type": "pointerUp", "button": 0}),
    ]
}

/// `POST /actions` body performing the gesture with one touch pointer.
pub fn pointer_actions(gesture: &TouchGesture) -> Value {
    let steps = match *gesture {
        TouchGesture::Tap { at } => press_release(at, TAP_HOLD_MS),
        TouchGesture::DoubleTap { at } => {
            let mut steps = press_release(at, TAP_HOLD_MS);
            steps.push(pause(DOUBLE_TAP_GAP_MS));
            steps.extend(press_release(at, TAP_HOLD_MS));
            steps
        }
        TouchGesture::LongPress { at, duration_ms } => press_release(at, duration_ms),
        TouchGesture::Swipe {
            from,
            to,
            duration_ms,
        } => stroke(from, to, TAP_HOLD_MS, duration_ms),
        TouchGesture::Drag {
            from,
            to,
            duration_ms,
        } => stroke(from, to, DRAG_PICKUP_MS, duration_ms),
    };

    json!({
        "actions": [{
            "type": "pointer",
            "id": "finger1",
            "parameters": {"pointerType": "touch"},
            "actions": steps,
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_selector_uses_platform_attribute() {
        let sel = Selector::text("Sign in");
        assert_eq!(
            locator(&sel, Platform::Android).unwrap(),
            ("xpath", "//*[@text='Sign in']".to_string())
        );
        assert_eq!(
            locator(&sel, Platform::Ios).unwrap().1,
            "//*[@label='Sign in']"
        );
    }

    #[test]
    fn test_platform_specific_selector_rejected_elsewhere() {
        let sel = Selector::new(SelectorType::IosPredicate, "name == 'x'");
        let err = locator(&sel, Platform::Android).unwrap_err();
        assert_eq!(err.kind, screengraph_core::ToolErrorType::UnsupportedPlatform);
    }

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal(r#"say "it's""#),
            r#"concat('say "it', "'", 's"')"#
        );
    }

    #[test]
    fn test_element_id_accepts_legacy_key() {
        assert_eq!(element_id(&json!({"ELEMENT": "e1"})).unwrap(), "e1");
        assert_eq!(element_id(&json!({W3C_ELEMENT_KEY: "e2"})).unwrap(), "e2");
        assert!(element_id(&json!({})).is_err());
    }

    #[test]
    fn test_double_tap_presses_twice() {
        let body = pointer_actions(&TouchGesture::DoubleTap { at: Point::new(5, 5) });
        let steps = body["actions"][0]["actions"].as_array().unwrap();
        let downs = steps.iter().filter(|s| s["type"] == "pointerDown").count();
        assert_eq!(downs, 2);
    }

    #[test]
    fn test_orientation_parsing() {
        assert_eq!(orientation(&json!("LANDSCAPE")).unwrap(), DeviceOrientation::Landscape);
        assert!(orientation(&json!(3)).is_err());
    }
}
