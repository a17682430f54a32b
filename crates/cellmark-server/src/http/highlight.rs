//! Highlight endpoints.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::Serialize;

use cellmark_core::app::App;
use cellmark_core::domain::{HighlightRequest, HostError, StoredFileName};

use super::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightResponse {
    pub highlighted_file_name: String,
}

/// `POST /highlight`
pub async fn highlight(
    State(app): State<App>,
    payload: Result<Json<HighlightRequest>, JsonRejection>,
) -> Result<Json<HighlightResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| HostError::BadRequest(e.body_text()))?;
    // クライアントが切断しても走り切る
    let outcome = app.orchestrator.clone().orchestrate_detached(request).await?;
    Ok(Json(HighlightResponse {
        highlighted_file_name: outcome.artifact.to_string(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveArtifactResponse {
    pub base_file_name: String,
    pub highlighted_file_name: Option<String>,
}

/// Current highlighted copy for a document (base or artifact name accepted).
pub async fn live_artifact(
    State(app): State<App>,
    Path(file_name): Path<String>,
) -> Result<Json<LiveArtifactResponse>, ApiError> {
    let base = StoredFileName::parse(file_name)
        .map_err(|e| HostError::NotFound(e.to_string()))?
        .base_name();
    app.store.stat(&base).await?;
    let live = app
        .orchestrator
        .registry()
        .live_artifact(base.stem())
        .await?;
    Ok(Json(LiveArtifactResponse {
        base_file_name: base.to_string(),
        highlighted_file_name: live.map(String::from),
    }))
}
