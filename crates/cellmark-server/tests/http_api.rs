//! End-to-end tests that drive the router in-process.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use cellmark_core::app::{App, AppBuilder};
use cellmark_core::domain::SPREADSHEET_CONTENT_TYPE;
use cellmark_core::impls::LocalFileStore;
use cellmark_core::impls::fakes::{FakeBehavior, RecordingExecutor, StaticDiscovery};
use cellmark_core::ports::{SteppingClock, Tunnel};
use cellmark_server::http::router;

const BOUNDARY: &str = "cellmark-test-boundary";

struct Harness {
    _dir: tempfile::TempDir,
    store_dir: PathBuf,
    app: App,
    executor: Arc<RecordingExecutor>,
    discovery: Arc<StaticDiscovery>,
    router: Router,
}

async fn harness_with(behavior: FakeBehavior) -> Harness {
    harness_with_executor(RecordingExecutor::new(behavior)).await
}

async fn harness_with_executor(executor: RecordingExecutor) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("public");
    let store = LocalFileStore::open_dir(&store_dir).await.unwrap();
    let executor = Arc::new(executor);
    let discovery = Arc::new(StaticDiscovery::unreachable());
    let app = AppBuilder::new()
        .file_store(Arc::new(store))
        .executor(executor.clone())
        .discovery(discovery.clone())
        .clock(Arc::new(SteppingClock::new(1_700_000_000_000, 7)))
        .loopback_url("http://localhost:3001")
        .build()
        .unwrap();
    let router = router(app.clone(), 10 * 1024 * 1024);
    Harness {
        _dir: dir,
        store_dir,
        app,
        executor,
        discovery,
        router,
    }
}

async fn harness() -> Harness {
    harness_with(FakeBehavior::Copy).await
}

impl Harness {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn upload(&self, file_name: &str, bytes: &[u8]) -> (StatusCode, Value) {
        self.send_json(multipart("file", Some(file_name), bytes)).await
    }

    async fn highlight(&self, file_name: &str, sheet: &str, ranges: &str) -> (StatusCode, Value) {
        self.send_json(post_json(
            "/highlight",
            json!({ "fileName": file_name, "sheetName": sheet, "cellRanges": ranges }),
        ))
        .await
    }

    fn stored_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.store_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, value: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

fn multipart(field: &str, file_name: Option<&str>, bytes: &[u8]) -> Request<Body> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {SPREADSHEET_CONTENT_TYPE}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::post("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn upload_highlight_and_fetch() {
    let h = harness().await;
    let report = vec![0x5au8; 12 * 1024];

    let (status, body) = h.upload("report.xlsx", &report).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fileName"], "report.xlsx");

    let (status, body) = h.highlight("report.xlsx", "Sheet1", "D15,B8").await;
    assert_eq!(status, StatusCode::OK);
    let artifact = body["highlightedFileName"].as_str().unwrap().to_string();
    assert!(artifact.starts_with("report_highlighted_"));
    assert!(artifact.ends_with(".xlsx"));

    let (status, info) = h
        .send_json(get(&format!("/document-host/files/{artifact}")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["BaseFileName"], artifact.as_str());
    assert_eq!(info["Size"], 12 * 1024);
    assert_eq!(info["SupportsUpdate"], false);
    assert_eq!(
        info["FileUrl"],
        format!("http://localhost:3001/document-host/files/{artifact}/contents")
    );

    let response = h
        .router
        .clone()
        .oneshot(get(&format!("/document-host/files/{artifact}/contents")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        SPREADSHEET_CONTENT_TYPE
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.len(), 12 * 1024);

    let jobs = h.executor.jobs();
    assert_eq!(jobs[0].cell_ranges.as_slice(), ["D15", "B8"]);
}

#[tokio::test]
async fn rehighlighting_from_an_artifact_name_replaces_it() {
    let h = harness().await;
    h.upload("report.xlsx", b"workbook").await;

    let (_, first) = h.highlight("report.xlsx", "Sheet1", "D15,B8").await;
    let first = first["highlightedFileName"].as_str().unwrap().to_string();

    let (status, second) = h.highlight(&first, "Sheet1", "B13:B15").await;
    assert_eq!(status, StatusCode::OK);
    let second = second["highlightedFileName"].as_str().unwrap().to_string();
    assert_ne!(first, second);
    assert!(second.starts_with("report_highlighted_"));

    assert_eq!(h.stored_names(), vec!["report.xlsx".to_string(), second.clone()]);

    let (status, _) = h
        .send(get(&format!("/document-host/files/{first}/contents")))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 2 回目も元のファイルから作られる
    let jobs = h.executor.jobs();
    assert!(jobs[1].source.ends_with("report.xlsx"));

    let (status, live) = h.send_json(get(&format!("/highlight/{first}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(live["baseFileName"], "report.xlsx");
    assert_eq!(live["highlightedFileName"], second.as_str());
}

#[tokio::test]
async fn client_disconnect_does_not_abort_highlighting() {
    let h = harness_with_executor(
        RecordingExecutor::new(FakeBehavior::Copy).with_delay(Duration::from_millis(300)),
    )
    .await;
    h.upload("report.xlsx", b"workbook").await;
    let (_, first) = h.highlight("report.xlsx", "Sheet1", "A1").await;
    let first = first["highlightedFileName"].as_str().unwrap().to_string();

    // レスポンスを待たずに future を捨てる
    let request = post_json(
        "/highlight",
        json!({ "fileName": "report.xlsx", "sheetName": "Sheet1", "cellRanges": "B2" }),
    );
    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), h.router.clone().oneshot(request)).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(700)).await;
    let names = h.stored_names();
    assert_eq!(names.len(), 2, "stored: {names:?}");
    assert!(names.contains(&"report.xlsx".to_string()));
    assert!(!names.contains(&first));
    assert_eq!(h.executor.jobs().len(), 2);
}

#[tokio::test]
async fn highlighting_a_missing_file_is_404_and_creates_nothing() {
    let h = harness().await;
    let (status, body) = h.highlight("absent.xlsx", "Sheet1", "A1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("absent.xlsx"));
    assert!(h.stored_names().is_empty());
    assert!(h.executor.jobs().is_empty());
}

#[tokio::test]
async fn empty_cell_ranges_still_succeed() {
    let h = harness().await;
    h.upload("report.xlsx", b"workbook").await;

    let (status, _) = h.highlight("report.xlsx", "Sheet1", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.executor.jobs()[0].cell_ranges.is_empty());
}

#[tokio::test]
async fn missing_fields_and_bad_json_are_400() {
    let h = harness().await;

    let (status, body) = h
        .send_json(post_json("/highlight", json!({ "fileName": "report.xlsx" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("sheet name"));

    let request = Request::post("/highlight")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = h.send_json(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn executor_failures_are_500_and_leave_no_artifact() {
    let h = harness_with(FakeBehavior::FailWithPartialOutput {
        code: 1,
        stderr: "Traceback (most recent call last)".to_string(),
    })
    .await;
    h.upload("report.xlsx", b"workbook").await;

    let (status, body) = h.highlight("report.xlsx", "Sheet1", "A1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("highlighting failed"));
    assert_eq!(h.stored_names(), vec!["report.xlsx"]);

    // サーバーは落ちずに次の要求を処理する
    let (status, _) = h.send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_highlighter_is_500() {
    let h = harness_with(FakeBehavior::Unavailable).await;
    h.upload("report.xlsx", b"workbook").await;

    let (status, body) = h.highlight("report.xlsx", "Sheet1", "A1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn upload_without_a_file_part_is_400() {
    let h = harness().await;
    let (status, body) = h.send_json(multipart("note", None, b"hello")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "upload failed: No file uploaded");
    assert!(h.stored_names().is_empty());
}

#[tokio::test]
async fn unknown_files_are_404() {
    let h = harness().await;
    let (status, body) = h.send_json(get("/document-host/files/nope.xlsx")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = h.send(get("/document-host/files/nope.xlsx/contents")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h.send(get("/highlight/nope.xlsx")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn file_info_version_changes_after_replacement() {
    let h = harness().await;
    h.upload("report.xlsx", b"v1").await;
    let (_, first) = h.send_json(get("/document-host/files/report.xlsx")).await;

    h.upload("report.xlsx", b"version two").await;
    let (_, second) = h.send_json(get("/document-host/files/report.xlsx")).await;

    assert_ne!(first["Version"], second["Version"]);
    assert_eq!(second["Size"], 11);
}

#[tokio::test]
async fn host_url_tracks_tunnel_discovery() {
    let h = harness().await;

    let (status, body) = h.send_json(get("/document-host/host-url")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hostUrl"], "http://localhost:3001");
    let (_, health) = h.send_json(get("/health")).await;
    assert_eq!(health["hostState"], "local");

    h.discovery.set(Some(vec![
        Tunnel::new("http://abc.ngrok.app"),
        Tunnel::new("https://abc.ngrok.app"),
    ]));
    let (_, body) = h.send_json(get("/document-host/host-url")).await;
    assert_eq!(body["hostUrl"], "https://abc.ngrok.app");

    h.discovery.set(None);
    let (status, body) = h.send_json(get("/document-host/host-url")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hostUrl"], "https://abc.ngrok.app");
    assert_eq!(h.app.session.base_url(), "https://abc.ngrok.app");

    let (_, health) = h.send_json(get("/health")).await;
    assert_eq!(health["hostState"], "published");
}

#[tokio::test]
async fn cors_is_permissive() {
    let h = harness().await;
    let request = Request::get("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
