//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use std::sync::Arc;

use tracing::info;

use super::document_host::DocumentHost;
use super::host_session::HostSession;
use super::orchestrator::HighlightOrchestrator;
use crate::domain::{HostError, HostIdentity, OverlayData, StoredFileName};
use crate::ports::{
    Clock, FileStore, HighlightExecutor, StoredFile, SystemClock, TunnelDiscovery,
    WorkbookInspector,
};

/// AppBuilder は ports を受け取って App を組み立てる
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .file_store(Arc::new(LocalFileStore::open_dir("./public").await?))
///     .executor(Arc::new(ProcessHighlightExecutor::new("python3", "app.py")))
///     .discovery(Arc::new(NgrokTunnelDiscovery::new(DEFAULT_TUNNEL_API)?))
///     .loopback_url("http://localhost:3001")
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - 必須の port（file_store, executor, discovery, loopback_url）が
///   揃っていなければ build() が BuildError を返す
/// - clock, overlay, inspector, identity は任意（デフォルトあり）
pub struct AppBuilder {
    store: Option<Arc<dyn FileStore>>,
    executor: Option<Arc<dyn HighlightExecutor>>,
    discovery: Option<Arc<dyn TunnelDiscovery>>,
    inspector: Option<Arc<dyn WorkbookInspector>>,
    clock: Arc<dyn Clock>,
    overlay: OverlayData,
    identity: HostIdentity,
    loopback_url: Option<String>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing components: {0:?}. These components are required but were not provided.")]
    MissingComponents(Vec<&'static str>),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            executor: None,
            discovery: None,
            inspector: None,
            clock: Arc::new(SystemClock),
            overlay: OverlayData::default(),
            identity: HostIdentity::default(),
            loopback_url: None,
        }
    }

    pub fn file_store(mut self, store: Arc<dyn FileStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn executor(mut self, executor: Arc<dyn HighlightExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn discovery(mut self, discovery: Arc<dyn TunnelDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// 設定するとハイライト前にシートの存在を確認する
    pub fn inspector(mut self, inspector: Arc<dyn WorkbookInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn overlay(mut self, overlay: OverlayData) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn identity(mut self, identity: HostIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// HostSession の初期値（`Local` 状態のベース URL）
    pub fn loopback_url(mut self, url: impl Into<String>) -> Self {
        self.loopback_url = Some(url.into());
        self
    }

    /// AppBuilder を構築して App を生成
    ///
    /// # 検証
    /// - 必須コンポーネントが全て設定されているかチェック
    /// - 不足があれば BuildError::MissingComponents を返す（不足分を全部列挙）
    pub fn build(self) -> Result<App, BuildError> {
        let mut missing = Vec::new();
        if self.store.is_none() {
            missing.push("file_store");
        }
        if self.executor.is_none() {
            missing.push("executor");
        }
        if self.discovery.is_none() {
            missing.push("discovery");
        }
        if self.loopback_url.is_none() {
            missing.push("loopback_url");
        }
        let (Some(store), Some(executor), Some(discovery), Some(loopback_url)) =
            (self.store, self.executor, self.discovery, self.loopback_url)
        else {
            return Err(BuildError::MissingComponents(missing));
        };

        let session = Arc::new(HostSession::new(loopback_url));
        let document_host = DocumentHost::new(
            store.clone(),
            session.clone(),
            discovery,
            self.clock.clone(),
        )
        .with_identity(self.identity);

        let mut orchestrator = HighlightOrchestrator::new(
            store.clone(),
            executor,
            self.clock,
            Arc::new(self.overlay),
        );
        if let Some(inspector) = self.inspector {
            orchestrator = orchestrator.with_inspector(inspector);
        }

        Ok(App {
            store,
            session,
            document_host: Arc::new(document_host),
            orchestrator: Arc::new(orchestrator),
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App は組み立て済みのサービス群
///
/// 全フィールドが Arc なので安価に Clone でき、HTTP ハンドラの state になる。
#[derive(Clone)]
pub struct App {
    pub store: Arc<dyn FileStore>,
    pub session: Arc<HostSession>,
    pub document_host: Arc<DocumentHost>,
    pub orchestrator: Arc<HighlightOrchestrator>,
}

impl App {
    /// アップロードされたファイルを元の名前のまま保存する
    pub async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile, HostError> {
        let name = StoredFileName::parse(file_name)?;
        let stored = self.store.put(&name, bytes).await?;
        info!(file = %stored.name, size = stored.size, "file uploaded");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::host_session::HostState;
    use crate::impls::LocalFileStore;
    use crate::impls::fakes::{RecordingExecutor, StaticDiscovery};

    #[tokio::test]
    async fn test_build_success() {
        let dir = tempfile::tempdir().unwrap();
        let app = AppBuilder::new()
            .file_store(Arc::new(LocalFileStore::open_dir(dir.path()).await.unwrap()))
            .executor(Arc::new(RecordingExecutor::default()))
            .discovery(Arc::new(StaticDiscovery::unreachable()))
            .loopback_url("http://localhost:3001")
            .build()
            .unwrap();
        assert_eq!(app.session.state(), HostState::Local);
        assert_eq!(app.session.base_url(), "http://localhost:3001");
    }

    #[test]
    fn test_build_missing_components() {
        let app = AppBuilder::new()
            .executor(Arc::new(RecordingExecutor::default()))
            .build();
        assert!(matches!(
            app,
            Err(BuildError::MissingComponents(missing))
                if missing == vec!["file_store", "discovery", "loopback_url"]
        ));
    }

    #[tokio::test]
    async fn test_upload_keeps_original_name() {
        let dir = tempfile::tempdir().unwrap();
        let app = AppBuilder::new()
            .file_store(Arc::new(LocalFileStore::open_dir(dir.path()).await.unwrap()))
            .executor(Arc::new(RecordingExecutor::default()))
            .discovery(Arc::new(StaticDiscovery::unreachable()))
            .loopback_url("http://localhost:3001")
            .build()
            .unwrap();

        let stored = app.upload("Q3 report.xlsx", b"bytes").await.unwrap();
        assert_eq!(stored.name.as_str(), "Q3 report.xlsx");
        assert!(dir.path().join("Q3 report.xlsx").exists());

        assert!(matches!(
            app.upload("../escape.xlsx", b"x").await,
            Err(HostError::BadRequest(_))
        ));
    }
}
