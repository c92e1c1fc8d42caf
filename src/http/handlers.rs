use crate::controller::TransitionOutcome;
use crate::error::{Result, StategateError};
use crate::gate::{GateDecision, GatePolicy};
use crate::probe::SystemInfo;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::{debug, error, info};

use super::server::ServerState;

#[derive(Debug, Deserialize)]
struct StateRequest {
    state: String,
}

/// `GET /state`
pub async fn get_state_handler(State(state): State<ServerState>) -> impl IntoResponse {
    state.controller.current_state().await.to_string()
}

/// `PUT /state` with a plain-text name or `{"state": "<name>"}`
pub async fn put_state_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<String> {
    let requested = requested_state_name(&headers, &body)?;

    match state.controller.transition_named(&requested).await? {
        TransitionOutcome::Unchanged => Ok("State unchanged".to_string()),
        TransitionOutcome::Changed { to, .. } => Ok(format!("State changed to {}", to)),
    }
}

/// `GET /request`, refused while PAUSED or SHUTDOWN
pub async fn request_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let current = state.controller.current_state().await;

    match GatePolicy::Lenient.evaluate(current) {
        GateDecision::Allowed => (StatusCode::OK, "Service response: OK"),
        GateDecision::Rejected { status, reason } => {
            debug!("Request rejected in state {}: {}", current, reason);
            (status_code(status), reason)
        }
    }
}

/// `GET /run-log`
pub async fn run_log_handler(State(state): State<ServerState>) -> impl IntoResponse {
    state.controller.render_audit_log().await
}

/// `GET /api`, served only while RUNNING
pub async fn api_handler(State(state): State<ServerState>) -> Result<Json<SystemInfo>> {
    let current = state.controller.current_state().await;
    GatePolicy::Strict.evaluate(current).into_result()?;

    let info = state.probe.collect().await.map_err(|e| {
        error!("System probe failed: {}", e);
        e
    })?;

    Ok(Json(info))
}

/// `GET /health`
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let health_info = serde_json::json!({
        "status": "healthy",
        "state": state.controller.current_state().await,
        "audit_entries": state.controller.audit_len().await,
        "last_cleanup": state.controller.last_cleanup(),
    });

    (StatusCode::OK, Json(health_info))
}

/// `POST /stop`, reaps containers without changing state
pub async fn stop_handler(State(state): State<ServerState>) -> impl IntoResponse {
    info!("Container stop requested over HTTP");
    let report = match state.controller.reap_now().await {
        Ok(report) => report,
        Err(e) => {
            error!("Container stop failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error stopping containers.".to_string(),
            );
        }
    };

    if !report.is_clean() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error stopping containers.".to_string(),
        );
    }

    if report.stopped.is_empty() {
        return (
            StatusCode::OK,
            "All containers stopped successfully.".to_string(),
        );
    }

    let stopped = report
        .stopped
        .iter()
        .map(|handle| handle.id())
        .collect::<Vec<_>>()
        .join("\n");
    (StatusCode::OK, stopped)
}

/// Extract the requested state name according to the request's content type
fn requested_state_name(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match media_type.as_str() {
        "text/plain" => String::from_utf8(body.to_vec())
            .map_err(|_| StategateError::invalid_state("<non-utf8 body>")),
        "application/json" => serde_json::from_slice::<StateRequest>(body)
            .map(|request| request.state)
            .map_err(|e| StategateError::invalid_state(format!("<malformed json: {}>", e))),
        _ => Err(StategateError::UnsupportedMediaType {
            content_type: content_type.to_string(),
        }),
    }
}

pub(crate) fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
