//! HostSession - Document Host の公開ベース URL
//!
//! # 状態遷移
//! - `Local`: 安全な公開 URL が未発見（ループバックのデフォルト URL）
//! - `Published`: TLS トンネルの URL が判明済み
//!
//! `Local → Published` は発見成功時のみ。`Local` に戻るのはプロセス再起動だけです。
//! 永続化はしません。

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostState {
    Local,
    Published,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BaseUrl {
    Local(String),
    Published(String),
}

/// HostSession はプロセス内で共有される（`Arc<HostSession>`）
///
/// グローバル変数ではなく明示的に注入するので、テストでは複数の
/// ホストを独立に立てられます。
#[derive(Debug)]
pub struct HostSession {
    url: RwLock<BaseUrl>,
}

impl HostSession {
    pub fn new(loopback_url: impl Into<String>) -> Self {
        Self {
            url: RwLock::new(BaseUrl::Local(normalize(loopback_url.into()))),
        }
    }

    pub fn base_url(&self) -> String {
        match &*self.url.read().unwrap_or_else(|p| p.into_inner()) {
            BaseUrl::Local(url) | BaseUrl::Published(url) => url.clone(),
        }
    }

    pub fn state(&self) -> HostState {
        match &*self.url.read().unwrap_or_else(|p| p.into_inner()) {
            BaseUrl::Local(_) => HostState::Local,
            BaseUrl::Published(_) => HostState::Published,
        }
    }

    /// 公開 URL を記録する。URL が変わったら true
    pub fn publish(&self, public_url: impl Into<String>) -> bool {
        let next = BaseUrl::Published(normalize(public_url.into()));
        let mut guard = self.url.write().unwrap_or_else(|p| p.into_inner());
        if *guard == next {
            return false;
        }
        *guard = next;
        true
    }
}

fn normalize(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
