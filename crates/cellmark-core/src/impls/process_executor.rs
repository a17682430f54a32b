//! ProcessHighlightExecutor - 外部スクリプトを子プロセスとして起動する実装
//!
//! # 学習ポイント
//! - tokio::process による非同期な子プロセス待ち（サーバーをブロックしない）
//! - `tokio::time::timeout` + `kill_on_drop` による上限付き待機
//!
//! # 引数（位置引数）
//! 1. 入力ファイルのパス
//! 2. シート名
//! 3. セル範囲の JSON 配列
//! 4. 結合セルの JSON
//! 5. グラフの JSON
//! 6. 画像の JSON
//! 7. 出力ファイルのパス

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::domain::{ExecutorReport, HighlightFailure, HighlightJob, HostError};
use crate::ports::HighlightExecutor;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// ログに出す JSON 引数の最大長
const PREVIEW_CHARS: usize = 100;

/// ProcessHighlightExecutor は `<interpreter> <script> args...` を起動
///
/// # 使用例
/// ```ignore
/// let executor = ProcessHighlightExecutor::new("python3", "app.py")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct ProcessHighlightExecutor {
    interpreter: OsString,
    script: PathBuf,
    timeout: Duration,
}

impl ProcessHighlightExecutor {
    pub fn new(interpreter: impl Into<OsString>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self, job: &HighlightJob) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(&self.script)
            .arg(&job.source)
            .arg(&job.sheet_name)
            .arg(job.cell_ranges.to_json())
            .arg(job.overlay.merged_cells_json())
            .arg(job.overlay.charts_json())
            .arg(job.overlay.images_json())
            .arg(&job.destination)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// インタプリタが無い・実行できないのは依存関係の欠落
    fn spawn_error(&self, err: io::Error) -> HostError {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                HostError::MissingDependency(format!(
                    "cannot run highlighter interpreter {}: {err}",
                    self.interpreter.to_string_lossy()
                ))
            }
            _ => HighlightFailure::Spawn(err).into(),
        }
    }
}

fn preview(json: &str) -> String {
    let mut out: String = json.chars().take(PREVIEW_CHARS).collect();
    if out.len() < json.len() {
        out.push_str("...");
    }
    out
}

#[async_trait]
impl HighlightExecutor for ProcessHighlightExecutor {
    async fn check_available(&self) -> Result<(), HostError> {
        match tokio::fs::metadata(&self.script).await {
            Ok(meta) if meta.is_file() => Ok(()),
            _ => Err(HostError::MissingDependency(format!(
                "highlighter script not found: {}",
                self.script.display()
            ))),
        }
    }

    async fn highlight(&self, job: &HighlightJob) -> Result<ExecutorReport, HostError> {
        debug!(
            input = %job.source.display(),
            sheet = %job.sheet_name,
            ranges = %job.cell_ranges.to_json(),
            merged_cells = %preview(&job.overlay.merged_cells_json()),
            charts = %preview(&job.overlay.charts_json()),
            images = %preview(&job.overlay.images_json()),
            output = %job.destination.display(),
            "spawning highlighter"
        );

        let child = self.command(job).spawn().map_err(|err| self.spawn_error(err))?;

        // タイムアウトで future が drop されると kill_on_drop で子プロセスも止まる
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(HighlightFailure::Spawn)?,
            Err(_) => {
                error!(timeout = ?self.timeout, "highlighter timed out; killed");
                return Err(HighlightFailure::Timeout(self.timeout).into());
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(HighlightFailure::Exit {
                code: output.status.code(),
                stderr,
                stdout,
            }
            .into());
        }

        info!(output = %job.destination.display(), "highlighter exited successfully");
        Ok(ExecutorReport { stdout, stderr })
    }
}
