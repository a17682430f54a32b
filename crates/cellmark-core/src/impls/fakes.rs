//! Fakes - テスト・開発用の port 実装
//!
//! サーバー側の結合テストからも使うので `#[cfg(test)]` にはしていません。

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ExecutorReport, HighlightFailure, HighlightJob, HostError};
use crate::ports::{
    DiscoveryError, HighlightExecutor, InspectError, Tunnel, TunnelDiscovery, WorkbookInspector,
};

/// 振る舞いの切り替え
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FakeBehavior {
    /// source を destination にコピーして成功
    #[default]
    Copy,
    /// 部分的な出力を残して非 0 終了
    FailWithPartialOutput { code: i32, stderr: String },
    /// 成功を返すが何も書かない
    SucceedWithoutOutput,
    /// `check_available` が MissingDependency
    Unavailable,
}

/// RecordingExecutor は受け取った job を記録する HighlightExecutor
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    behavior: FakeBehavior,
    delay: Option<Duration>,
    jobs: Mutex<Vec<HighlightJob>>,
}

impl RecordingExecutor {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// 実行に時間がかかるふりをする（並行性のテスト用）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn jobs(&self) -> Vec<HighlightJob> {
        self.jobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl HighlightExecutor for RecordingExecutor {
    async fn check_available(&self) -> Result<(), HostError> {
        if self.behavior == FakeBehavior::Unavailable {
            return Err(HostError::MissingDependency(
                "highlighter script not found: app.py".to_string(),
            ));
        }
        Ok(())
    }

    async fn highlight(&self, job: &HighlightJob) -> Result<ExecutorReport, HostError> {
        self.jobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(job.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behavior {
            FakeBehavior::Copy | FakeBehavior::Unavailable => {
                tokio::fs::copy(&job.source, &job.destination).await?;
                Ok(ExecutorReport::default())
            }
            FakeBehavior::FailWithPartialOutput { code, stderr } => {
                tokio::fs::write(&job.destination, b"partial").await?;
                Err(HighlightFailure::Exit {
                    code: Some(*code),
                    stderr: stderr.clone(),
                    stdout: String::new(),
                }
                .into())
            }
            FakeBehavior::SucceedWithoutOutput => Ok(ExecutorReport::default()),
        }
    }
}

/// StaticDiscovery は決まったトンネル一覧（または到達不能）を返す
#[derive(Debug, Default)]
pub struct StaticDiscovery {
    tunnels: Mutex<Option<Vec<Tunnel>>>,
}

impl StaticDiscovery {
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_tunnels(tunnels: Vec<Tunnel>) -> Self {
        Self {
            tunnels: Mutex::new(Some(tunnels)),
        }
    }

    /// `None` で到達不能に戻す
    pub fn set(&self, tunnels: Option<Vec<Tunnel>>) {
        *self
            .tunnels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = tunnels;
    }
}

#[async_trait]
impl TunnelDiscovery for StaticDiscovery {
    async fn tunnels(&self) -> Result<Vec<Tunnel>, DiscoveryError> {
        self.tunnels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or_else(|| DiscoveryError::Unreachable("connection refused".to_string()))
    }
}

/// StubInspector は決まったシート名を返す（`None` なら読めないワークブック）
#[derive(Debug, Clone, Default)]
pub struct StubInspector {
    sheets: Option<Vec<String>>,
}

impl StubInspector {
    pub fn with_sheets(sheets: &[&str]) -> Self {
        Self {
            sheets: Some(sheets.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn unreadable() -> Self {
        Self { sheets: None }
    }
}

#[async_trait]
impl WorkbookInspector for StubInspector {
    async fn sheet_names(&self, _path: &Path) -> Result<Vec<String>, InspectError> {
        self.sheets
            .clone()
            .ok_or_else(|| InspectError::Unreadable("not a workbook".to_string()))
    }
}
