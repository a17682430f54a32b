//! HighlightExecutor port - セル範囲をハイライトした新しいファイルを作る
//!
//! Orchestrator はこの trait だけに依存します。実装は子プロセスでも、
//! ライブラリ呼び出しでも、リモートサービスでも構いません。

use async_trait::async_trait;

use crate::domain::{ExecutorReport, HighlightJob, HostError};

/// HighlightExecutor は `job.source` を読み、`job.destination` に書く
///
/// # 契約
/// - 成功時は `destination` に有効なスプレッドシートが存在する
/// - 失敗は `HostError::HighlightFailed`（診断出力付き）
#[async_trait]
pub trait HighlightExecutor: Send + Sync {
    /// 実行に必要なもの（スクリプトなど）が揃っているか
    ///
    /// 揃っていなければ `HostError::MissingDependency`
    async fn check_available(&self) -> Result<(), HostError>;

    async fn highlight(&self, job: &HighlightJob) -> Result<ExecutorReport, HostError>;
}
