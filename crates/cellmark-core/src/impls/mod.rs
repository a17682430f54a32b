//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **LocalFileStore**: ローカルディレクトリの File Store
//! - **ProcessHighlightExecutor**: 外部スクリプトを起動する Highlight Executor
//! - **NgrokTunnelDiscovery**: ngrok のローカル API を使うトンネル発見
//! - **CalamineInspector**: calamine によるシート名の読み出し
//! - **fakes**: テスト・開発用（RecordingExecutor, StaticDiscovery, StubInspector）

pub mod calamine_inspector;
pub mod fakes;
pub mod local_store;
pub mod ngrok_discovery;
pub mod process_executor;

// 主要な型を再エクスポート
pub use self::calamine_inspector::CalamineInspector;
pub use self::local_store::LocalFileStore;
pub use self::ngrok_discovery::{DEFAULT_TUNNEL_API, NgrokTunnelDiscovery};
pub use self::process_executor::ProcessHighlightExecutor;
