//! ArtifactRegistry - base ドキュメントごとの「生きている」成果物の管理
//!
//! 専用の台帳は持たず、File Store のファイル名（命名規則とタイムスタンプ）から
//! 状態を導きます。
//!
//! # 不変条件
//! - base ごとに保持される成果物は高々 1 つ
//! - cleanup はトランザクションではない（ロールバック無し、何度実行しても安全）

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{HostError, StoredFileName};
use crate::ports::FileStore;

#[derive(Clone)]
pub struct ArtifactRegistry {
    store: Arc<dyn FileStore>,
}

impl ArtifactRegistry {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    /// `<stem>_highlighted_*.xlsx` をすべて削除し、削除できた名前を返す
    ///
    /// 一覧の取得や個々の削除に失敗しても、ログを出して続行する。
    pub async fn cleanup_artifacts(&self, stem: &str) -> Vec<StoredFileName> {
        let names = match self.store.list().await {
            Ok(names) => names,
            Err(err) => {
                warn!(stem, error = %err, "could not list files for cleanup");
                return Vec::new();
            }
        };

        let mut removed = Vec::new();
        for name in names.into_iter().filter(|n| n.is_artifact_of(stem)) {
            match self.store.remove(&name).await {
                Ok(()) => {
                    info!(file = %name, "cleaned up previous highlight file");
                    removed.push(name);
                }
                Err(err) => warn!(file = %name, error = %err, "error cleaning up file"),
            }
        }
        removed
    }

    /// 最新の成果物（埋め込まれたタイムスタンプが最大のもの）
    pub async fn live_artifact(&self, stem: &str) -> Result<Option<StoredFileName>, HostError> {
        Ok(self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|n| n.is_artifact_of(stem))
            .filter_map(|n| n.artifact_timestamp().map(|ts| (ts, n)))
            .max_by_key(|(ts, _)| *ts)
            .map(|(_, n)| n))
    }
}
