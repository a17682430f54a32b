//! NgrokTunnelDiscovery - ngrok のローカル API（`/api/tunnels`）を叩く実装

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ports::{DiscoveryError, Tunnel, TunnelDiscovery};

pub const DEFAULT_TUNNEL_API: &str = "http://127.0.0.1:4040";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct TunnelList {
    #[serde(default)]
    tunnels: Vec<Tunnel>,
}

/// NgrokTunnelDiscovery は `<api_base>/api/tunnels` を問い合わせる
#[derive(Debug, Clone)]
pub struct NgrokTunnelDiscovery {
    client: reqwest::Client,
    endpoint: String,
}

impl NgrokTunnelDiscovery {
    pub fn new(api_base: &str) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DiscoveryError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/tunnels", api_base.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn parse_tunnels(body: &str) -> Result<Vec<Tunnel>, DiscoveryError> {
    serde_json::from_str::<TunnelList>(body)
        .map(|list| list.tunnels)
        .map_err(|e| DiscoveryError::Malformed(e.to_string()))
}

#[async_trait]
impl TunnelDiscovery for NgrokTunnelDiscovery {
    async fn tunnels(&self) -> Result<Vec<Tunnel>, DiscoveryError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DiscoveryError::Unreachable(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| DiscoveryError::Unreachable(e.to_string()))?;
        parse_tunnels(&body)
    }
}
