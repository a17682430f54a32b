//! HTTP surface.
//!
//! | Method & Path | Handler |
//! |---|---|
//! | GET `/document-host/files/:file_id` | CheckFileInfo |
//! | GET `/document-host/files/:file_id/contents` | GetFile (streamed) |
//! | GET `/document-host/host-url` | best-known public base URL |
//! | POST `/highlight` | orchestrate a highlight |
//! | GET `/highlight/:file_name` | current highlighted copy |
//! | POST `/upload` | multipart upload |
//! | GET `/health` | liveness + host state |

pub mod document_host;
pub mod error;
pub mod highlight;
pub mod upload;

use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use cellmark_core::app::{App, HostState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub host_state: HostState,
}

async fn health(State(app): State<App>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        host_state: app.session.state(),
    })
}

pub fn router(app: App, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/document-host/files/:file_id",
            get(document_host::check_file_info),
        )
        .route(
            "/document-host/files/:file_id/contents",
            get(document_host::get_file),
        )
        .route("/document-host/host-url", get(document_host::host_url))
        .route("/highlight", post(highlight::highlight))
        .route("/highlight/:file_name", get(highlight::live_artifact))
        .route(
            "/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}
