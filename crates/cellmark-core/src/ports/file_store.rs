//! FileStore port - スプレッドシートを置くフラットなディレクトリ
//!
//! # 設計原則
//! - ファイル名がキー（[`StoredFileName`] で検証済み）
//! - ファイルはその場で書き換えない（ハイライトは常に新しいファイルを作る）
//! - 削除は Version Registry の cleanup だけが行う

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncRead;

use crate::domain::{HostError, StoredFileName};

/// ストリーミング読み出し用のリーダー
pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;

/// StoredFile は File Store 内の 1 ファイルのメタ情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: StoredFileName,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// FileStore はファイルの参照・一覧・作成・削除を提供
///
/// # Thread Safety
/// - `Send + Sync` を要求（リクエストをまたいで共有する）
#[async_trait]
pub trait FileStore: Send + Sync {
    /// 無ければ `HostError::NotFound`
    async fn stat(&self, name: &StoredFileName) -> Result<StoredFile, HostError>;

    /// 全体をバッファせずに読むためのリーダーを返す
    async fn open(&self, name: &StoredFileName) -> Result<(StoredFile, FileReader), HostError>;

    async fn list(&self) -> Result<Vec<StoredFileName>, HostError>;

    async fn put(&self, name: &StoredFileName, bytes: &[u8]) -> Result<StoredFile, HostError>;

    /// 既に無いファイルの削除は成功扱い
    async fn remove(&self, name: &StoredFileName) -> Result<(), HostError>;

    /// 子プロセスに渡す実パス
    fn path_of(&self, name: &StoredFileName) -> PathBuf;

    async fn exists(&self, name: &StoredFileName) -> bool {
        self.stat(name).await.is_ok()
    }
}
