//! Errors - エラー型と分類
//!
//! HTTP 層は [`HostError::kind`] を見てステータスコードを決めます。
//! ドメイン側はステータスコードを知りません。

use std::time::Duration;

use thiserror::Error;

/// ErrorKind は失敗の運用分類
///
/// # 分類
/// - NotFound: 要求されたファイルが File Store に無い
/// - BadRequest: 必須フィールドの欠落、存在しないシートなど
/// - MissingDependency: ハイライト用プログラムが使えない
/// - HighlightFailed: 子プロセスの異常終了・タイムアウト
/// - UploadFailed: multipart にファイルパートが無い
/// - Io: 上記以外のファイルシステム障害
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    MissingDependency,
    HighlightFailed,
    UploadFailed,
    Io,
}

/// HighlightFailure は Highlight Executor の失敗の内訳
#[derive(Debug, Error)]
pub enum HighlightFailure {
    /// 子プロセスが 0 以外で終了した（シグナル終了なら code は None）
    #[error("highlighter exited with {}", exit_label(.code))]
    Exit {
        code: Option<i32>,
        stderr: String,
        stdout: String,
    },

    #[error("failed to run highlighter: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("highlighter did not finish within {0:?}")]
    Timeout(Duration),

    /// 正常終了したのに出力ファイルが無い
    #[error("highlighter exited successfully but produced no output file")]
    MissingOutput,
}

impl HighlightFailure {
    /// ログ用の診断出力（stderr と stdout）
    pub fn diagnostics(&self) -> Option<String> {
        match self {
            Self::Exit { stderr, stdout, .. } => {
                Some(format!("Error:\n{stderr}\nOutput:\n{stdout}"))
            }
            _ => None,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

/// HostError はこのサブシステムのすべての失敗
#[derive(Debug, Error)]
pub enum HostError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("highlighter unavailable: {0}")]
    MissingDependency(String),

    #[error("highlighting failed: {0}")]
    HighlightFailed(#[from] HighlightFailure),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::MissingDependency(_) => ErrorKind::MissingDependency,
            Self::HighlightFailed(_) => ErrorKind::HighlightFailed,
            Self::UploadFailed(_) => ErrorKind::UploadFailed,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::HighlightFailed(HighlightFailure::Timeout(_)))
    }
}
