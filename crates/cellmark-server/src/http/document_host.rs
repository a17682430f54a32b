//! checkfile / getfile / host-url handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tokio_util::io::ReaderStream;

use cellmark_core::app::App;
use cellmark_core::domain::FileInfo;

use super::error::ApiError;

pub async fn check_file_info(
    State(app): State<App>,
    Path(file_id): Path<String>,
) -> Result<Json<FileInfo>, ApiError> {
    Ok(Json(app.document_host.resolve_file_info(&file_id).await?))
}

/// Streams the file; the body is never buffered whole.
pub async fn get_file(
    State(app): State<App>,
    Path(file_id): Path<String>,
) -> Result<Response, ApiError> {
    let contents = app.document_host.resolve_file_contents(&file_id).await?;
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static(contents.content_type),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(contents.file.size)),
    ];
    let body = Body::from_stream(ReaderStream::new(contents.reader));
    Ok((headers, body).into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostUrlResponse {
    pub host_url: String,
}

/// Never fails: answers with the best URL known after a refresh attempt.
pub async fn host_url(State(app): State<App>) -> Json<HostUrlResponse> {
    Json(HostUrlResponse {
        host_url: app.document_host.refresh_host_url().await,
    })
}
