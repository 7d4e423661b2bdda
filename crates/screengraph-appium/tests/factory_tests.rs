#[cfg(test)]
mod tests {
    use screengraph_appium::*;
    use screengraph_core::*;

    fn config_for(platform: &str) -> DriverConfig {
        let request = match platform {
            "ios" => DriverConfigRequest {
                platform: "ios".into(),
                device_name: "iPhone 15".into(),
                platform_version: "17.2".into(),
                bundle_id: Some("com.example.App".into()),
                ..Default::default()
            },
            _ => DriverConfigRequest {
                platform: "android".into(),
                device_name: "emulator-5554".into(),
                platform_version: "11.0".into(),
                app_package: Some("com.example.app".into()),
                ..Default::default()
            },
        };
        create_driver_config(&request).unwrap()
    }

    fn context_for(platform: &str) -> ToolExecutionContext {
        create_execution_context("run-1", "session-1", platform, "device-1").unwrap()
    }

    // ── Platform validation ────────────────────────────────────

    #[test]
    fn test_supported_platforms() {
        let platforms = get_supported_platforms();
        assert_eq!(platforms.len(), 2);
        assert!(platforms.contains("android"));
        assert!(platforms.contains("ios"));
    }

    #[test]
    fn test_validate_platform() {
        assert!(validate_platform("android"));
        assert!(validate_platform("IOS"));
        assert!(!validate_platform("windows"));
        assert!(!validate_platform(""));
    }

    // ── Construction ───────────────────────────────────────────

    #[test]
    fn test_unknown_platform_is_rejected() {
        let result = create_appium_tools("windows", config_for("android"), context_for("android"));
        assert!(!result.success());
        let err = result.error().unwrap();
        assert_eq!(err.kind, ToolErrorType::UnsupportedPlatform);
        assert!(err.message.contains("windows"));
        assert!(err.message.contains("android, ios"));
    }

    #[test]
    fn test_config_platform_mismatch_is_invalid() {
        let result = create_appium_tools("android", config_for("ios"), context_for("android"));
        assert_eq!(result.error_kind(), Some(ToolErrorType::InvalidConfiguration));
    }

    #[test]
    fn test_context_platform_mismatch_is_invalid() {
        let result = create_appium_tools("android", config_for("android"), context_for("ios"));
        assert_eq!(result.error_kind(), Some(ToolErrorType::InvalidConfiguration));
    }

    #[test]
    fn test_created_tools_start_uninitialized() {
        let tools = create_android_tools(config_for("android"), context_for("android"))
            .into_result()
            .unwrap();
        assert_eq!(tools.platform(), Platform::Android);
        assert_eq!(tools.state(), ToolState::Uninitialized);
        assert!(!tools.is_connected());
        assert_eq!(tools.context().run_id(), "run-1");
    }

    #[test]
    fn test_platform_name_is_case_insensitive() {
        let tools = create_appium_tools("Android", config_for("android"), context_for("android"));
        assert!(tools.success());
    }

    // ── iOS placeholder ────────────────────────────────────────

    #[tokio::test]
    async fn test_ios_backend_reports_unsupported() {
        let mut ios = IosAppiumTools::new();
        let shot = ios.screenshot().await;
        assert_eq!(shot.error_kind(), Some(ToolErrorType::UnsupportedPlatform));
        let tap = ios.tap(&Selector::accessibility_id("Login")).await;
        assert_eq!(tap.error_kind(), Some(ToolErrorType::UnsupportedPlatform));
        let conn = ios.connect(&config_for("ios")).await;
        assert_eq!(conn.error_kind(), Some(ToolErrorType::UnsupportedPlatform));
        assert!(ios.disconnect().await.success());
        assert!(!ios.is_connected());
    }

    #[tokio::test]
    async fn test_ios_facade_cannot_connect() {
        let mut tools = create_ios_tools(config_for("ios"), context_for("ios"))
            .into_result()
            .unwrap();
        tools.initialize(context_for("ios")).into_result().unwrap();

        let result = tools.connect(&config_for("ios")).await;
        assert_eq!(result.error_kind(), Some(ToolErrorType::UnsupportedPlatform));
        assert_eq!(tools.state(), ToolState::Initialized);
    }

    #[tokio::test]
    async fn test_ios_facade_calls_are_unsupported() {
        let mut tools = create_ios_tools(config_for("ios"), context_for("ios"))
            .into_result()
            .unwrap();

        // Before initialize and after a refused connect alike.
        let shot = tools.screenshot().await;
        assert_eq!(shot.error_kind(), Some(ToolErrorType::UnsupportedPlatform));

        tools.initialize(context_for("ios")).into_result().unwrap();
        tools.connect(&config_for("ios")).await;
        let shot = tools.screenshot().await;
        assert_eq!(shot.error_kind(), Some(ToolErrorType::UnsupportedPlatform));
        let tap = tools.tap_at(Point::new(10, 10)).await;
        assert_eq!(tap.error_kind(), Some(ToolErrorType::UnsupportedPlatform));
        let info = tools.get_platform_info().await;
        assert_eq!(info.error_kind(), Some(ToolErrorType::UnsupportedPlatform));

        assert!(tools.dispose().await.success());
        let shot = tools.screenshot().await;
        assert_eq!(shot.error_kind(), Some(ToolErrorType::SessionNotFound));
    }

    // ── Catalog ────────────────────────────────────────────────

    #[test]
    fn test_catalog_covers_facade_operations() {
        let catalog = tool_catalog();
        assert!(
            catalog
                .iter()
                .any(|t| t.name == "connect" && t.category == ToolCategory::Connection)
        );
        assert!(catalog.iter().any(|t| t.name == "get_logs" && !t.is_mutating));
        assert!(catalog.iter().any(|t| t.name == "set_orientation" && t.is_mutating));
        assert!(has_tool("perform_gesture"));
    }
}
