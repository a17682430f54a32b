//! DocumentHost - checkfile / getfile 契約の実装
//!
//! 外部の Viewer は参照で渡されたファイルを次の 2 段階で取得します。
//! 1. `GET /document-host/files/{id}` でメタ情報（CheckFileInfo）
//! 2. メタ情報の `FileUrl`（`.../contents`）から中身
//!
//! ホストは読み取り専用です（`SupportsUpdate = false`）。

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tracing::{debug, info, warn};

use super::host_session::HostSession;
use crate::domain::{FileInfo, HostError, HostIdentity, SPREADSHEET_CONTENT_TYPE, StoredFileName};
use crate::ports::{Clock, FileReader, FileStore, StoredFile, TunnelDiscovery, first_secure};

/// ファイル配信のルート（FileUrl の組み立てにも使う）
pub const FILES_ROUTE: &str = "/document-host/files";

/// getfile の結果
pub struct FileContents {
    pub file: StoredFile,
    pub content_type: &'static str,
    pub reader: FileReader,
}

impl std::fmt::Debug for FileContents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileContents")
            .field("file", &self.file)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

pub struct DocumentHost {
    store: Arc<dyn FileStore>,
    session: Arc<HostSession>,
    discovery: Arc<dyn TunnelDiscovery>,
    clock: Arc<dyn Clock>,
    identity: HostIdentity,
    last_version: AtomicI64,
}

impl DocumentHost {
    pub fn new(
        store: Arc<dyn FileStore>,
        session: Arc<HostSession>,
        discovery: Arc<dyn TunnelDiscovery>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            session,
            discovery,
            clock,
            identity: HostIdentity::default(),
            last_version: AtomicI64::new(i64::MIN),
        }
    }

    pub fn with_identity(mut self, identity: HostIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn session(&self) -> &Arc<HostSession> {
        &self.session
    }

    /// CheckFileInfo
    pub async fn resolve_file_info(&self, file_id: &str) -> Result<FileInfo, HostError> {
        let name = lookup_name(file_id)?;
        let file = self.store.stat(&name).await.inspect_err(|_| {
            warn!(file_id, "CheckFileInfo: file not found");
        })?;
        Ok(FileInfo {
            base_file_name: file.name.to_string(),
            size: file.size,
            owner_id: self.identity.owner_id.clone(),
            user_id: self.identity.user_id.clone(),
            version: self.next_version().to_string(),
            user_friendly_name: self.identity.friendly_name.clone(),
            file_url: self.content_url(&file.name),
            supports_update: false,
        })
    }

    /// GetFile
    pub async fn resolve_file_contents(&self, file_id: &str) -> Result<FileContents, HostError> {
        let name = lookup_name(file_id)?;
        let (file, reader) = self.store.open(&name).await.inspect_err(|_| {
            warn!(file_id, "GetFile: file not found");
        })?;
        debug!(file = %file.name, size = file.size, "streaming file contents");
        Ok(FileContents {
            file,
            content_type: SPREADSHEET_CONTENT_TYPE,
            reader,
        })
    }

    /// トンネル API に問い合わせてベース URL を更新し、最新の URL を返す
    ///
    /// 失敗しても前回の URL のまま（エラーにはしない）。毎回呼んでよい。
    pub async fn refresh_host_url(&self) -> String {
        match self.discovery.tunnels().await {
            Ok(tunnels) => match first_secure(&tunnels) {
                Some(tunnel) => {
                    if self.session.publish(tunnel.public_url.clone()) {
                        info!(host_url = %tunnel.public_url, "published host url");
                    }
                }
                None => debug!(count = tunnels.len(), "no secure tunnel yet"),
            },
            Err(err) => {
                info!(error = %err, "tunnel discovery not ready; keeping current host url");
            }
        }
        self.session.base_url()
    }

    pub fn content_url(&self, name: &StoredFileName) -> String {
        format!("{}{}/{}/contents", self.session.base_url(), FILES_ROUTE, name)
    }

    /// 呼ぶたびに必ず増える Version（時計が止まっていても）
    fn next_version(&self) -> i64 {
        let now = self.clock.now_millis();
        let mut prev = self.last_version.load(Ordering::SeqCst);
        loop {
            let next = now.max(prev.saturating_add(1));
            match self.last_version.compare_exchange_weak(
                prev,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// 不正な名前はどのファイルも指さないので NotFound
fn lookup_name(file_id: &str) -> Result<StoredFileName, HostError> {
    StoredFileName::parse(file_id).map_err(|_| HostError::NotFound(file_id.to_string()))
}
