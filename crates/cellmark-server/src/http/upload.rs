//! Multipart upload.

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;

use cellmark_core::app::App;
use cellmark_core::domain::HostError;

use super::error::ApiError;

/// Multipart field carrying the spreadsheet.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_name: String,
    pub message: &'static str,
}

pub async fn upload(
    State(app): State<App>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HostError::UploadFailed(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| HostError::UploadFailed(e.body_text()))?;
        let stored = app.upload(&file_name, &bytes).await?;
        return Ok(Json(UploadResponse {
            file_name: stored.name.to_string(),
            message: "File uploaded successfully",
        }));
    }
    Err(HostError::UploadFailed("No file uploaded".to_string()).into())
}
