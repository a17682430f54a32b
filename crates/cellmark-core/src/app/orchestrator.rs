//! HighlightOrchestrator - ハイライト要求の取りまとめ
//!
//! # フロー
//! 1. リクエストを検証（BadRequest）
//! 2. 要求されたファイル名から base ドキュメントを逆算
//! 3. base が無ければ NotFound、Executor が使えなければ MissingDependency
//! 4. シートの存在確認（読めないワークブックは Executor に任せる）
//! 5. 既存の成果物を cleanup（新しい成果物を作る前に）
//! 6. Executor を実行し、新しい成果物名を返す
//!
//! # 並行性
//! - 異なる base への要求は互いをブロックしない
//! - 同じ stem の base（成果物名を共有する `report.xlsx` と `report.csv` など）への
//!   要求は stem ごとの async Mutex で直列化する
//! - [`HighlightOrchestrator::orchestrate_detached`] は専用のタスクで実行するので、
//!   呼び出し側が待つのをやめても子プロセスは最後まで走る

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, error, info, warn};

use super::registry::ArtifactRegistry;
use crate::domain::{
    HighlightFailure, HighlightJob, HighlightOutcome, HighlightRequest, HostError, OverlayData,
    StoredFileName,
};
use crate::ports::{Clock, FileStore, HighlightExecutor, WorkbookInspector};

/// base の stem ごとのロック
///
/// cleanup と成果物名はどちらも stem 単位なので、ロックも stem で取る。
/// 使われなくなったロックは Weak が切れた時点で掃除する。
#[derive(Default)]
struct BaseLocks {
    locks: Mutex<HashMap<String, Weak<tokio::sync::Mutex<()>>>>,
}

impl BaseLocks {
    fn lock_for(&self, stem: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(lock) = locks.get(stem).and_then(Weak::upgrade) {
            return lock;
        }
        locks.retain(|_, weak| weak.strong_count() > 0);
        let lock = Arc::new(tokio::sync::Mutex::new(()));
        locks.insert(stem.to_string(), Arc::downgrade(&lock));
        lock
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

pub struct HighlightOrchestrator {
    store: Arc<dyn FileStore>,
    executor: Arc<dyn HighlightExecutor>,
    inspector: Option<Arc<dyn WorkbookInspector>>,
    clock: Arc<dyn Clock>,
    overlay: Arc<OverlayData>,
    registry: ArtifactRegistry,
    locks: BaseLocks,
}

impl HighlightOrchestrator {
    pub fn new(
        store: Arc<dyn FileStore>,
        executor: Arc<dyn HighlightExecutor>,
        clock: Arc<dyn Clock>,
        overlay: Arc<OverlayData>,
    ) -> Self {
        Self {
            registry: ArtifactRegistry::new(store.clone()),
            store,
            executor,
            inspector: None,
            clock,
            overlay,
            locks: BaseLocks::default(),
        }
    }

    /// シートの存在確認を有効にする
    pub fn with_inspector(mut self, inspector: Arc<dyn WorkbookInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    /// `orchestrate` を専用のタスクで走らせて結果を待つ
    ///
    /// 返された future を drop しても（HTTP クライアントの切断など）タスクは
    /// 止まらず、成果物の作成と cleanup は完了する。結果だけが捨てられる。
    pub async fn orchestrate_detached(
        self: Arc<Self>,
        request: HighlightRequest,
    ) -> Result<HighlightOutcome, HostError> {
        let task = tokio::spawn(async move { self.orchestrate(&request).await });
        match task.await {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "highlight task did not complete");
                Err(HostError::Io(io::Error::other(err)))
            }
        }
    }

    pub async fn orchestrate(
        &self,
        request: &HighlightRequest,
    ) -> Result<HighlightOutcome, HostError> {
        let request = request.validate()?;
        let base = request.file_name.base_name();
        info!(
            requested = %request.file_name,
            base = %base,
            sheet = %request.sheet_name,
            ranges = request.cell_ranges.len(),
            "highlight requested"
        );

        let lock = self.locks.lock_for(base.stem());
        let _guard = lock.lock().await;

        self.store.stat(&base).await.inspect_err(|_| {
            error!(base = %base, "original file not found");
        })?;
        self.executor.check_available().await?;

        let source = self.store.path_of(&base);
        self.check_sheet(&source, &request.sheet_name).await?;

        let artifact = base.artifact(self.clock.now_millis());
        let retired: Vec<StoredFileName> = self
            .registry
            .cleanup_artifacts(base.stem())
            .await
            .into_iter()
            .filter(|name| *name != artifact)
            .collect();

        let job = HighlightJob {
            source,
            sheet_name: request.sheet_name.clone(),
            cell_ranges: request.cell_ranges.clone(),
            overlay: self.overlay.clone(),
            destination: self.store.path_of(&artifact),
        };

        match self.executor.highlight(&job).await {
            Ok(report) => {
                debug!(stdout = %report.stdout, stderr = %report.stderr, "highlighter output");
            }
            Err(err) => {
                match &err {
                    HostError::HighlightFailed(failure) => error!(
                        base = %base,
                        error = %failure,
                        diagnostics = %failure.diagnostics().unwrap_or_default(),
                        "highlighting failed"
                    ),
                    other => error!(base = %base, error = %other, "highlighting failed"),
                }
                self.discard(&artifact).await;
                return Err(err);
            }
        }

        if !self.store.exists(&artifact).await {
            error!(artifact = %artifact, "highlighter produced no output file");
            return Err(HighlightFailure::MissingOutput.into());
        }

        info!(base = %base, artifact = %artifact, retired = retired.len(), "highlight complete");
        Ok(HighlightOutcome {
            base,
            artifact,
            retired,
        })
    }

    /// 要求されたシートがワークブックにあるか（大文字小文字は区別しない）
    async fn check_sheet(&self, source: &Path, sheet: &str) -> Result<(), HostError> {
        let Some(inspector) = &self.inspector else {
            return Ok(());
        };
        match inspector.sheet_names(source).await {
            Ok(sheets) => {
                let wanted = sheet.to_lowercase();
                if sheets.iter().any(|s| s.to_lowercase() == wanted) {
                    Ok(())
                } else {
                    Err(HostError::BadRequest(format!(
                        "sheet '{sheet}' not found in workbook; available sheets: {}",
                        sheets.join(", ")
                    )))
                }
            }
            Err(err) => {
                warn!(error = %err, "could not inspect workbook; leaving sheet check to the highlighter");
                Ok(())
            }
        }
    }

    /// 失敗時の途中出力は参照されないように消しておく
    async fn discard(&self, artifact: &StoredFileName) {
        if let Err(err) = self.store.remove(artifact).await {
            warn!(artifact = %artifact, error = %err, "could not remove partial output");
        }
    }
}
