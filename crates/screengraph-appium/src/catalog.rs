//! Static description of every tool operation, for orchestrators that
//! discover capabilities at runtime.

use screengraph_core::{ToolCategory, ToolMetadata};

const CATALOG: &[(&str, &str, ToolCategory, bool)] = &[
    // ── Connection ────────────────────────────────────────────
    (
        "connect",
        "Open a driver session on the configured device and app.",
        ToolCategory::Connection,
        false,
    ),
    (
        "disconnect",
        "Close the driver session. Safe to call when not connected.",
        ToolCategory::Connection,
        false,
    ),
    ("is_connected", "Whether a live driver session exists.", ToolCategory::Connection, false),
    // ── Data gathering ────────────────────────────────────────
    ("screenshot", "Capture the screen as a base64 PNG.", ToolCategory::DataGathering, false),
    ("get_page_source", "Return the UI hierarchy as XML.", ToolCategory::DataGathering, false),
    (
        "get_element_info",
        "Describe the first element matching a selector.",
        ToolCategory::DataGathering,
        false,
    ),
    (
        "find_elements",
        "Describe every element matching a selector.",
        ToolCategory::DataGathering,
        false,
    ),
    (
        "get_app_state",
        "Report the foreground app and the target app's lifecycle state.",
        ToolCategory::DataGathering,
        false,
    ),
    (
        "get_network_info",
        "Report wifi, mobile data and airplane mode status.",
        ToolCategory::DataGathering,
        false,
    ),
    (
        "get_logs",
        "Return device log lines since the previous call.",
        ToolCategory::DataGathering,
        false,
    ),
    ("get_screen_size", "Return the screen size in pixels.", ToolCategory::DataGathering, false),
    (
        "get_orientation",
        "Return the current screen orientation.",
        ToolCategory::DataGathering,
        false,
    ),
    (
        "get_platform_info",
        "Return platform, OS version and device identity of the session.",
        ToolCategory::DataGathering,
        false,
    ),
    // ── Actions ───────────────────────────────────────────────
    ("tap", "Tap the first element matching a selector.", ToolCategory::Action, true),
    ("tap_at", "Tap at screen coordinates.", ToolCategory::Action, true),
    (
        "long_press",
        "Press and hold the first element matching a selector.",
        ToolCategory::Action,
        true,
    ),
    ("swipe", "Swipe across the screen in a direction.", ToolCategory::Action, true),
    ("scroll", "Scroll the content one page in a direction.", ToolCategory::Action, true),
    (
        "perform_gesture",
        "Perform a tap, double tap, long press, swipe or drag at explicit coordinates.",
        ToolCategory::Action,
        true,
    ),
    (
        "input_text",
        "Type text into the first element matching a selector.",
        ToolCategory::Action,
        true,
    ),
    (
        "clear_text",
        "Clear the text of the first element matching a selector.",
        ToolCategory::Action,
        true,
    ),
    ("press_back", "Press the system back button.", ToolCategory::Action, true),
    ("hide_keyboard", "Dismiss the on-screen keyboard.", ToolCategory::Action, true),
    ("launch_app", "Bring an installed app to the foreground.", ToolCategory::Action, true),
    ("terminate_app", "Stop a running app.", ToolCategory::Action, true),
    ("grant_permission", "Grant a runtime permission to an app.", ToolCategory::Action, true),
    ("revoke_permission", "Revoke a runtime permission from an app.", ToolCategory::Action, true),
    (
        "open_deep_link",
        "Open a deep link URL, optionally in a given app.",
        ToolCategory::Action,
        true,
    ),
    ("set_orientation", "Rotate the screen to portrait or landscape.", ToolCategory::Action, true),
];

/// Metadata for every capability operation, grouped by category.
pub fn tool_catalog() -> Vec<ToolMetadata> {
    CATALOG
        .iter()
        .map(|&(name, description, category, is_mutating)| ToolMetadata {
            name: name.to_string(),
            description: description.to_string(),
            category,
            is_mutating,
        })
        .collect()
}

/// Check if a tool name belongs to the catalog.
pub fn has_tool(name: &str) -> bool {
    CATALOG.iter().any(|(n, ..)| *n == name)
}
