//! LocalFileStore - ローカルディレクトリ上の File Store
//!
//! # 実装詳細
//! - tokio::fs でディレクトリ直下のファイルだけを扱う（サブディレクトリは無視）
//! - `put` は一時ファイル `.<name>.<seq>.part` に書いてから rename する
//!   （途中状態は list / stat / open のどれからも見えない）
//! - `remove` は NotFound を成功扱い（cleanup の冪等性）

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::domain::{HostError, StoredFileName};
use crate::ports::{FileReader, FileStore, StoredFile};

/// LocalFileStore はフラットなディレクトリ
///
/// # 使用例
/// ```ignore
/// let store = LocalFileStore::open_dir("./public").await?;
/// let file = store.stat(&StoredFileName::parse("report.xlsx")?).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// ディレクトリが無ければ作成する
    pub async fn open_dir(root: impl Into<PathBuf>) -> Result<Self, HostError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// 同じ名前への同時 put が一時ファイルを取り合わないための通し番号
static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

const STAGING_SUFFIX: &str = ".part";

fn is_staging(raw: &str) -> bool {
    raw.starts_with('.') && raw.ends_with(STAGING_SUFFIX)
}

fn not_found_or_io(name: &StoredFileName, err: io::Error) -> HostError {
    if err.kind() == io::ErrorKind::NotFound {
        HostError::NotFound(name.to_string())
    } else {
        HostError::Io(err)
    }
}

fn to_stored(name: &StoredFileName, meta: &std::fs::Metadata) -> StoredFile {
    StoredFile {
        name: name.clone(),
        size: meta.len(),
        modified: meta.modified().ok().map(DateTime::<Utc>::from),
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn stat(&self, name: &StoredFileName) -> Result<StoredFile, HostError> {
        if is_staging(name.as_str()) {
            return Err(HostError::NotFound(name.to_string()));
        }
        let meta = tokio::fs::metadata(self.path_of(name))
            .await
            .map_err(|e| not_found_or_io(name, e))?;
        if !meta.is_file() {
            return Err(HostError::NotFound(name.to_string()));
        }
        Ok(to_stored(name, &meta))
    }

    async fn open(&self, name: &StoredFileName) -> Result<(StoredFile, FileReader), HostError> {
        if is_staging(name.as_str()) {
            return Err(HostError::NotFound(name.to_string()));
        }
        let file = tokio::fs::File::open(self.path_of(name))
            .await
            .map_err(|e| not_found_or_io(name, e))?;
        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(HostError::NotFound(name.to_string()));
        }
        Ok((to_stored(name, &meta), Box::new(file)))
    }

    async fn list(&self) -> Result<Vec<StoredFileName>, HostError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Ok(raw) = entry.file_name().into_string() else {
                continue;
            };
            if is_staging(&raw) {
                continue;
            }
            if let Ok(name) = StoredFileName::parse(raw) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn put(&self, name: &StoredFileName, bytes: &[u8]) -> Result<StoredFile, HostError> {
        if is_staging(name.as_str()) {
            return Err(HostError::BadRequest(format!("reserved file name: {name}")));
        }
        let target = self.path_of(name);
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        let staging = self
            .root
            .join(format!(".{name}.{seq}{STAGING_SUFFIX}"));
        let mut file = tokio::fs::File::create(&staging).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        if let Err(err) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }
        self.stat(name).await
    }

    async fn remove(&self, name: &StoredFileName) -> Result<(), HostError> {
        match tokio::fs::remove_file(self.path_of(name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn path_of(&self, name: &StoredFileName) -> PathBuf {
        self.root.join(name.as_str())
    }
}
