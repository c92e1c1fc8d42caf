use super::server::router;
use super::ControlServerBuilder;
use crate::config::ServerConfig;
use crate::controller::StateController;
use crate::error::{Result, StategateError};
use crate::probe::{ProcessEntry, SystemInfo, SystemProbe};
use crate::reaper::{ContainerReaper, MockRuntime};
use crate::state::State;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct StaticProbe;

#[async_trait]
impl SystemProbe for StaticProbe {
    async fn collect(&self) -> Result<SystemInfo> {
        Ok(SystemInfo {
            service: "test-service".to_string(),
            ip_address: "192.0.2.10".to_string(),
            processes: vec![ProcessEntry {
                pid: 1,
                name: "init".to_string(),
            }],
            free_disk_bytes: 4096,
            uptime_seconds: 120,
        })
    }
}

struct FailingProbe;

#[async_trait]
impl SystemProbe for FailingProbe {
    async fn collect(&self) -> Result<SystemInfo> {
        Err(StategateError::probe("disk table unreadable"))
    }
}

struct Harness {
    app: Router,
    runtime: Arc<MockRuntime>,
}

fn harness_with(runtime: MockRuntime, probe: Arc<dyn SystemProbe>) -> Harness {
    let runtime = Arc::new(runtime);
    let reaper = ContainerReaper::new(
        Arc::clone(&runtime) as Arc<dyn crate::reaper::ContainerRuntime>,
        Duration::from_secs(1),
        Duration::from_millis(200),
    );
    let controller = Arc::new(StateController::new(reaper));

    Harness {
        app: router(controller, probe),
        runtime,
    }
}

fn harness() -> Harness {
    harness_with(MockRuntime::default(), Arc::new(StaticProbe))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn put_state(app: &Router, content_type: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/state")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn put_text(app: &Router, name: &str) -> (StatusCode, String) {
    put_state(app, "text/plain", name).await
}

#[tokio::test]
async fn test_initial_state_is_init() {
    let h = harness();
    assert_eq!(get(&h.app, "/state").await, (StatusCode::OK, "INIT".to_string()));
}

#[tokio::test]
async fn test_put_then_get_every_state() {
    let h = harness();

    for state in [State::Paused, State::Running, State::Shutdown, State::Init] {
        let (status, body) = put_text(&h.app, state.as_str()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("State changed to {}", state));

        assert_eq!(
            get(&h.app, "/state").await,
            (StatusCode::OK, state.to_string())
        );
    }
}

#[tokio::test]
async fn test_put_json_body() {
    let h = harness();

    let (status, body) = put_state(&h.app, "application/json", r#"{"state": "PAUSED"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "State changed to PAUSED");
}

#[tokio::test]
async fn test_content_type_parameters_are_ignored() {
    let h = harness();

    let (status, _) = put_state(&h.app, "text/plain; charset=utf-8", "RUNNING").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(get(&h.app, "/state").await.1, "RUNNING");
}

#[tokio::test]
async fn test_same_state_twice_is_unchanged() {
    let h = harness();

    put_text(&h.app, "RUNNING").await;
    let (status, body) = put_text(&h.app, "RUNNING").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "State unchanged");

    let (_, log) = get(&h.app, "/run-log").await;
    assert_eq!(log.lines().count(), 1);
}

#[tokio::test]
async fn test_invalid_state_is_rejected() {
    let h = harness();
    put_text(&h.app, "RUNNING").await;

    let (status, body) = put_text(&h.app, "DANCING").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, serde_json::json!({"error": "Invalid state"}));

    assert_eq!(get(&h.app, "/state").await.1, "RUNNING");
}

#[tokio::test]
async fn test_malformed_json_is_invalid_state() {
    let h = harness();

    let (status, _) = put_state(&h.app, "application/json", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put_state(&h.app, "application/json", r#"{"mode": "RUNNING"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(get(&h.app, "/state").await.1, "INIT");
}

#[tokio::test]
async fn test_unsupported_media_type() {
    let h = harness();

    let (status, _) = put_state(&h.app, "application/xml", "<state>RUNNING</state>").await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/state")
        .body(Body::from("RUNNING"))
        .unwrap();
    let (status, _) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    assert_eq!(get(&h.app, "/state").await.1, "INIT");
}

#[tokio::test]
async fn test_request_gate_blocks_paused_but_not_init() {
    let h = harness();

    assert_eq!(
        get(&h.app, "/request").await,
        (StatusCode::OK, "Service response: OK".to_string())
    );

    put_text(&h.app, "PAUSED").await;
    assert_eq!(
        get(&h.app, "/request").await,
        (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable".to_string())
    );

    put_text(&h.app, "RUNNING").await;
    assert_eq!(get(&h.app, "/request").await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_init_to_running_scenario() {
    let h = harness();

    let (status, body) = put_text(&h.app, "RUNNING").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "State changed to RUNNING");
    assert_eq!(get(&h.app, "/state").await.1, "RUNNING");

    let (status, log) = get(&h.app, "/run-log").await;
    assert_eq!(status, StatusCode::OK);
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("INIT->RUNNING"));
}

#[tokio::test]
async fn test_run_log_empty_after_init() {
    let h = harness();

    put_text(&h.app, "RUNNING").await;
    put_text(&h.app, "PAUSED").await;
    put_text(&h.app, "INIT").await;

    assert_eq!(get(&h.app, "/run-log").await, (StatusCode::OK, String::new()));
}

#[tokio::test]
async fn test_api_follows_strict_gate() {
    let h = harness();

    let (status, body) = get(&h.app, "/api").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Service not initialized"));

    put_text(&h.app, "PAUSED").await;
    let (status, body) = get(&h.app, "/api").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("Service unavailable"));

    put_text(&h.app, "RUNNING").await;
    let (status, body) = get(&h.app, "/api").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["Service"], "test-service");
    assert_eq!(json["IP Address"], "192.0.2.10");
    assert_eq!(json["Available Disk Space"], 4096);
}

#[tokio::test]
async fn test_api_probe_failure_is_500() {
    let h = harness_with(MockRuntime::default(), Arc::new(FailingProbe));
    put_text(&h.app, "RUNNING").await;

    let (status, body) = get(&h.app, "/api").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, serde_json::json!({"error": "disk table unreadable"}));
}

#[tokio::test]
async fn test_shutdown_scenario_with_failing_cleanup() {
    let h = harness_with(
        MockRuntime::with_containers(["web", "db"]).fail_on("db"),
        Arc::new(StaticProbe),
    );
    put_text(&h.app, "RUNNING").await;

    let (status, body) = put_text(&h.app, "SHUTDOWN").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "State changed to SHUTDOWN");
    assert_eq!(h.runtime.stop_calls().len(), 2);

    let (status, body) = get(&h.app, "/request").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "Service unavailable");

    let (status, body) = get(&h.app, "/api").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("Service has been shut down"));
}

#[tokio::test]
async fn test_health_reports_state_and_cleanup() {
    let h = harness_with(MockRuntime::with_containers(["web"]), Arc::new(StaticProbe));
    put_text(&h.app, "SHUTDOWN").await;

    let (status, body) = get(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["state"], "SHUTDOWN");
    assert_eq!(json["audit_entries"], 1);
    assert_eq!(json["last_cleanup"]["attempted"], 1);
    assert_eq!(json["last_cleanup"]["stopped"][0], "web");
}

#[tokio::test]
async fn test_stop_endpoint() {
    let h = harness_with(MockRuntime::with_containers(["a1", "b2"]), Arc::new(StaticProbe));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/stop")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "a1\nb2");
    assert_eq!(get(&h.app, "/state").await.1, "INIT");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/stop")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "All containers stopped successfully.");
}

#[tokio::test]
async fn test_stop_endpoint_failure() {
    let h = harness_with(
        MockRuntime::default().fail_listing("cannot connect"),
        Arc::new(StaticProbe),
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/stop")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error stopping containers.");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_puts_change_once() {
    let h = harness();

    let requests = (0..8).map(|_| put_text(&h.app, "PAUSED"));
    let responses = futures::future::join_all(requests).await;

    let changed = responses
        .iter()
        .filter(|(_, body)| body == "State changed to PAUSED")
        .count();
    let unchanged = responses
        .iter()
        .filter(|(_, body)| body == "State unchanged")
        .count();
    assert_eq!(changed, 1);
    assert_eq!(unchanged, 7);
    assert_eq!(get(&h.app, "/run-log").await.1.lines().count(), 1);
}

#[tokio::test]
async fn test_server_builder_validation() {
    let controller = Arc::new(StateController::new(ContainerReaper::new(
        Arc::new(MockRuntime::default()),
        Duration::from_secs(1),
        Duration::from_secs(1),
    )));
    let config = ServerConfig {
        ip: "127.0.0.1".to_string(),
        port: 8197,
        shutdown_timeout_seconds: 5,
    };

    let server = ControlServerBuilder::new()
        .config(config.clone())
        .controller(Arc::clone(&controller))
        .probe(Arc::new(StaticProbe))
        .build()
        .unwrap();
    assert_eq!(server.config.address(), "127.0.0.1:8197");

    let result = ControlServerBuilder::new()
        .controller(Arc::clone(&controller))
        .probe(Arc::new(StaticProbe))
        .build();
    assert!(result.is_err());

    let result = ControlServerBuilder::new()
        .config(config)
        .controller(controller)
        .build();
    assert!(result.is_err());
}
