//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部（ファイルシステム、ハイライト用プログラム、トンネル API、
//! ワークブック）へのインターフェースを提供し、実装の詳細を隠蔽します。

pub mod clock;
pub mod file_store;
pub mod highlight_executor;
pub mod tunnel_discovery;
pub mod workbook_inspector;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SteppingClock, SystemClock};
pub use self::file_store::{FileReader, FileStore, StoredFile};
pub use self::highlight_executor::HighlightExecutor;
pub use self::tunnel_discovery::{DiscoveryError, Tunnel, TunnelDiscovery, first_secure};
pub use self::workbook_inspector::{InspectError, WorkbookInspector};
