#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use screengraph_appium::*;
    use screengraph_core::*;

    fn driver_for(server: &MockServer, timeout: Duration) -> HttpDriver {
        let url = Url::parse(&server.uri()).unwrap();
        HttpDriver::new(&url, timeout).unwrap()
    }

    // ── Response unwrapping ────────────────────────────────────

    #[tokio::test]
    async fn test_value_member_is_unwrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session/s1/source"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"value": "<hierarchy/>"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let driver = driver_for(&server, Duration::from_secs(5));
        let value = driver
            .send(DriverCommand::get("/session/s1/source"))
            .await
            .unwrap();
        assert_eq!(value, json!("<hierarchy/>"));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session/s1/element"))
            .and(body_partial_json(json!({"using": "id", "value": "login"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"value": {"element-6066-11e4-a52e-4f735466cecf": "e1"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let driver = driver_for(&server, Duration::from_secs(5));
        let value = driver
            .send(DriverCommand::post(
                "/session/s1/element",
                json!({"using": "id", "value": "login"}),
            ))
            .await
            .unwrap();
        assert_eq!(protocol::element_id(&value).unwrap(), "e1");
    }

    // ── Error mapping ──────────────────────────────────────────

    #[tokio::test]
    async fn test_w3c_error_payload_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session/s1/element"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "value": {
                    "error": "no such element",
                    "message": "An element could not be located",
                    "stacktrace": ""
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/session/gone/source"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "value": {"error": "invalid session id", "message": "session deleted"}
            })))
            .mount(&server)
            .await;

        let driver = driver_for(&server, Duration::from_secs(5));
        let err = driver
            .send(DriverCommand::post("/session/s1/element", json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ToolErrorType::ElementNotFound);

        let err = driver
            .send(DriverCommand::get("/session/gone/source"))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::InvalidSession(_)));
    }

    #[tokio::test]
    async fn test_non_json_failure_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session/s1/screenshot"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let driver = driver_for(&server, Duration::from_secs(5));
        let err = driver
            .send(DriverCommand::get("/session/s1/screenshot"))
            .await
            .unwrap_err();
        match err {
            DriverError::Protocol {
                status, message, ..
            } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let driver = driver_for(&server, Duration::from_secs(5));
        let err = driver.send(DriverCommand::get("/status")).await.unwrap_err();
        assert!(matches!(err, DriverError::InvalidResponse(_)));
        assert_eq!(err.kind(), ToolErrorType::DriverError);
    }

    #[tokio::test]
    async fn test_slow_server_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session/s1/source"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"value": ""}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let driver = driver_for(&server, Duration::from_millis(100));
        let err = driver
            .send(DriverCommand::get("/session/s1/source"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ToolErrorType::Timeout);
    }

    // ── End to end ─────────────────────────────────────────────

    #[tokio::test]
    async fn test_session_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .and(body_partial_json(json!({
                "capabilities": {"alwaysMatch": {"platformName": "Android"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": {"sessionId": "http-1", "capabilities": {"platformVersion": "14"}}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session/http-1/timeouts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": null})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/session/http-1/window/rect"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": {"x": 0, "y": 0, "width": 720, "height": 1280}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/session/http-1/orientation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": "PORTRAIT"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/session/http-1/source"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"value": "<hierarchy rotation=\"0\"/>"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/session/http-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": null})))
            .expect(1)
            .mount(&server)
            .await;

        let config = create_driver_config(&DriverConfigRequest {
            server_url: Some(server.uri()),
            platform: "android".into(),
            device_name: "Pixel 8".into(),
            platform_version: "14".into(),
            ..Default::default()
        })
        .unwrap();
        let context = create_execution_context("run-http", "s", "android", "Pixel 8").unwrap();
        let mut tools = create_appium_tools("android", config.clone(), context.clone())
            .into_result()
            .unwrap();
        tools.initialize(context).into_result().unwrap();

        let info = tools.connect(&config).await.into_result().unwrap();
        assert_eq!(info.session_id, "http-1");
        assert_eq!(info.screen_size, ScreenSize::new(720, 1280));
        assert_eq!(info.platform_info.platform_version, "14");

        let source = tools.get_page_source().await.into_result().unwrap();
        assert!(source.starts_with("<hierarchy"));

        assert!(tools.disconnect().await.success());
    }
}
