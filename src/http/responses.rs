use crate::error::StategateError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use super::handlers::status_code;

impl IntoResponse for StategateError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            StategateError::InvalidState { name } => {
                debug!("Rejected invalid state {:?}", name);
                (StatusCode::BAD_REQUEST, "Invalid state".to_string())
            }
            StategateError::UnsupportedMediaType { content_type } => {
                debug!("Rejected content type {:?}", content_type);
                (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "Unsupported media type".to_string(),
                )
            }
            StategateError::GateRejected { status, reason } => {
                (status_code(*status), reason.to_string())
            }
            StategateError::Probe { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
            other => {
                error!("Unhandled error while serving request: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
