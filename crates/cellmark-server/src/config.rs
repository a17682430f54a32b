//! Config - コマンドライン引数と環境変数
//!
//! すべての値は `--flag` か `CELLMARK_*` 環境変数で与えられます。

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use cellmark_core::app::{App, AppBuilder, BuildError};
use cellmark_core::domain::{HostError, OverlayData};
use cellmark_core::impls::{
    CalamineInspector, DEFAULT_TUNNEL_API, LocalFileStore, NgrokTunnelDiscovery,
    ProcessHighlightExecutor,
};
use cellmark_core::ports::DiscoveryError;

#[derive(Debug, Clone, Parser)]
#[command(name = "cellmark-server", about = "Spreadsheet document host and highlight orchestrator")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "CELLMARK_BIND", default_value = "127.0.0.1:3001")]
    pub bind: SocketAddr,

    /// Directory holding uploaded spreadsheets and highlighted copies
    #[arg(long, env = "CELLMARK_STORE_DIR", default_value = "./public")]
    pub store_dir: PathBuf,

    /// Directory with merged_cells.json / charts.json / images.json (defaults to the store dir)
    #[arg(long, env = "CELLMARK_OVERLAY_DIR")]
    pub overlay_dir: Option<PathBuf>,

    /// Interpreter used to run the highlighter script
    #[arg(long, env = "CELLMARK_PYTHON", default_value = "python3")]
    pub python: String,

    /// Highlighter script
    #[arg(long, env = "CELLMARK_SCRIPT", default_value = "app.py")]
    pub script: PathBuf,

    /// Upper bound for one highlighter run, in seconds
    #[arg(long, env = "CELLMARK_HIGHLIGHT_TIMEOUT_SECS", default_value_t = 120)]
    pub highlight_timeout_secs: u64,

    /// Base URL of the local tunnel API
    #[arg(long, env = "CELLMARK_TUNNEL_API", default_value = DEFAULT_TUNNEL_API)]
    pub tunnel_api: String,

    /// Largest accepted upload, in megabytes
    #[arg(long, env = "CELLMARK_MAX_UPLOAD_MB", default_value_t = 50)]
    pub max_upload_mb: usize,

    /// Skip checking that the requested sheet exists before highlighting
    #[arg(long, env = "CELLMARK_NO_SHEET_CHECK")]
    pub no_sheet_check: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("highlight timeout must be at least one second")]
    ZeroTimeout,

    #[error("max upload size must be at least one megabyte")]
    ZeroUploadLimit,

    #[error("cannot open store directory: {0}")]
    Store(#[source] HostError),

    #[error("cannot set up tunnel discovery: {0}")]
    Discovery(#[source] DiscoveryError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.highlight_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_upload_mb == 0 {
            return Err(ConfigError::ZeroUploadLimit);
        }
        Ok(())
    }

    /// `Local` 状態のベース URL
    pub fn loopback_url(&self) -> String {
        format!("http://localhost:{}", self.bind.port())
    }

    pub fn highlight_timeout(&self) -> Duration {
        Duration::from_secs(self.highlight_timeout_secs)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn overlay_dir(&self) -> PathBuf {
        self.overlay_dir.clone().unwrap_or_else(|| self.store_dir.clone())
    }

    /// 本番用の port 実装で App を組み立てる
    pub async fn build_app(&self) -> Result<App, ConfigError> {
        self.validate()?;

        let store = LocalFileStore::open_dir(&self.store_dir)
            .await
            .map_err(ConfigError::Store)?;
        let executor = ProcessHighlightExecutor::new(&self.python, &self.script)
            .with_timeout(self.highlight_timeout());
        let discovery =
            NgrokTunnelDiscovery::new(&self.tunnel_api).map_err(ConfigError::Discovery)?;
        let overlay = OverlayData::load(&self.overlay_dir()).await;

        let mut builder = AppBuilder::new()
            .file_store(Arc::new(store))
            .executor(Arc::new(executor))
            .discovery(Arc::new(discovery))
            .overlay(overlay)
            .loopback_url(self.loopback_url());
        if !self.no_sheet_check {
            builder = builder.inspector(Arc::new(CalamineInspector));
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["cellmark-server"]).unwrap();
        assert_eq!(config.bind.port(), 3001);
        assert_eq!(config.loopback_url(), "http://localhost:3001");
        assert_eq!(config.python, "python3");
        assert_eq!(config.highlight_timeout(), Duration::from_secs(120));
        assert_eq!(config.overlay_dir(), PathBuf::from("./public"));
        assert_eq!(config.max_upload_bytes(), 50 * 1024 * 1024);
        assert!(!config.no_sheet_check);
        config.validate().unwrap();
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "cellmark-server",
            "--bind",
            "0.0.0.0:8080",
            "--store-dir",
            "/srv/sheets",
            "--overlay-dir",
            "/srv/overlay",
            "--highlight-timeout-secs",
            "5",
            "--no-sheet-check",
        ])
        .unwrap();
        assert_eq!(config.loopback_url(), "http://localhost:8080");
        assert_eq!(config.overlay_dir(), PathBuf::from("/srv/overlay"));
        assert_eq!(config.highlight_timeout(), Duration::from_secs(5));
        assert!(config.no_sheet_check);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config =
            Config::try_parse_from(["cellmark-server", "--highlight-timeout-secs", "0"]).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[tokio::test]
    async fn builds_app_over_a_fresh_store_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store_dir = dir.path().join("public");
        let config = Config::try_parse_from([
            "cellmark-server",
            "--store-dir",
            store_dir.to_str().unwrap(),
        ])
        .unwrap();

        let app = config.build_app().await.unwrap();
        assert!(store_dir.is_dir());
        assert_eq!(app.session.base_url(), "http://localhost:3001");
    }
}
