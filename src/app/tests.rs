use super::*;
use crate::config::StategateConfig;
use crate::error::{ServerError, StategateError};
use crate::state::State;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn create_test_config(journal_dir: &Path) -> StategateConfig {
    let mut config = StategateConfig::default();
    config.server.ip = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.shutdown_timeout_seconds = 5;
    config.reaper.enabled = false;
    config.journal.path = journal_dir.join("run.log").to_string_lossy().into_owned();
    config
}

async fn http_get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_app_creation() {
    let dir = tempfile::tempdir().unwrap();
    let app = StategateApp::new(create_test_config(dir.path()))
        .await
        .unwrap();

    assert_eq!(app.component_summary().await, "");
    assert!(app.local_addr().is_none());
    assert_eq!(app.controller().current_state().await, State::Init);
    assert!(dir.path().join("run.log").exists());
}

#[tokio::test]
async fn test_journal_disabled_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(dir.path());
    config.journal.enabled = false;

    let _app = StategateApp::new(config).await.unwrap();
    assert!(!dir.path().join("run.log").exists());
}

#[tokio::test]
async fn test_start_serves_and_shuts_down() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = StategateApp::new(create_test_config(dir.path()))
        .await
        .unwrap();

    app.start().await.unwrap();
    assert_eq!(
        app.get_component_state("server").await,
        Some(ComponentState::Running)
    );

    let addr = app.local_addr().unwrap();
    let response = http_get(addr, "/state").await;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with("INIT"));

    let exit_code = app.shutdown().await.unwrap();
    assert_eq!(exit_code, 0);
    assert_eq!(
        app.get_component_state("server").await,
        Some(ComponentState::Stopped)
    );
    assert_eq!(app.component_summary().await, "server=Stopped");
}

#[tokio::test]
async fn test_transitions_reach_journal_through_app() {
    let dir = tempfile::tempdir().unwrap();
    let app = StategateApp::new(create_test_config(dir.path()))
        .await
        .unwrap();

    let controller = app.controller();
    controller.transition(State::Running).await.unwrap();
    controller.transition(State::Paused).await.unwrap();

    let contents = tokio::fs::read_to_string(dir.path().join("run.log"))
        .await
        .unwrap();
    assert_eq!(contents.lines().count(), 2);
}

#[tokio::test]
async fn test_bind_failure_marks_server_failed() {
    let dir = tempfile::tempdir().unwrap();
    let mut first = StategateApp::new(create_test_config(dir.path()))
        .await
        .unwrap();
    first.start().await.unwrap();
    let taken = first.local_addr().unwrap();

    let other_dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(other_dir.path());
    config.server.port = taken.port();
    let mut second = StategateApp::new(config).await.unwrap();

    let result = second.start().await;
    assert!(matches!(
        result,
        Err(StategateError::Server(ServerError::BindFailed { .. }))
    ));
    assert_eq!(
        second.get_component_state("server").await,
        Some(ComponentState::Failed)
    );

    first.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_without_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = StategateApp::new(create_test_config(dir.path()))
        .await
        .unwrap();

    assert_eq!(app.shutdown().await.unwrap(), 0);
    assert_eq!(
        app.get_component_state("server").await,
        Some(ComponentState::Stopped)
    );
}

#[tokio::test]
async fn test_component_state_transitions() {
    let dir = tempfile::tempdir().unwrap();
    let app = StategateApp::new(create_test_config(dir.path()))
        .await
        .unwrap();
    let component = "test_component";

    assert_eq!(app.get_component_state(component).await, None);
    app.set_component_state("server", ComponentState::Running)
        .await;

    for state in [
        ComponentState::Starting,
        ComponentState::Running,
        ComponentState::Stopping,
        ComponentState::Stopped,
    ] {
        app.set_component_state(component, state.clone()).await;
        assert_eq!(app.get_component_state(component).await, Some(state));
    }

    assert_eq!(
        app.component_summary().await,
        "server=Running, test_component=Stopped"
    );
}
