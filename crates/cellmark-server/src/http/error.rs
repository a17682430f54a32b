//! Error → HTTP response mapping.
//!
//! Every failure leaves as `{ "error": "<message>" }` with a status derived
//! from [`ErrorKind`]. Nothing here panics; the server keeps serving.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use cellmark_core::domain::{ErrorKind, HostError};

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::BadRequest | ErrorKind::UploadFailed => StatusCode::BAD_REQUEST,
        ErrorKind::MissingDependency | ErrorKind::HighlightFailed | ErrorKind::Io => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Debug)]
pub struct ApiError(pub HostError);

impl From<HostError> for ApiError {
    fn from(value: HostError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "request rejected");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
