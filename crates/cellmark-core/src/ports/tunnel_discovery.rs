//! TunnelDiscovery port - このホストを外部に公開しているトンネルの発見
//!
//! Viewer が別マシンにある場合、ループバックの URL では届きません。
//! ローカルのトンネル管理 API に問い合わせて公開 URL を得ます。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunnel は 1 本のトンネル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tunnel {
    pub public_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<String>,
}

impl Tunnel {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into(),
            name: None,
            proto: None,
        }
    }

    pub fn is_secure(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

/// 最初の TLS トンネル
pub fn first_secure(tunnels: &[Tunnel]) -> Option<&Tunnel> {
    tunnels.iter().find(|tunnel| tunnel.is_secure())
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("tunnel api unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected tunnel api response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait TunnelDiscovery: Send + Sync {
    async fn tunnels(&self) -> Result<Vec<Tunnel>, DiscoveryError>;
}
