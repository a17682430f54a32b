//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **HostSession**: 公開ベース URL の状態（Local / Published）
//! - **DocumentHost**: checkfile / getfile 契約
//! - **ArtifactRegistry**: base ごとの成果物の cleanup と最新成果物の導出
//! - **HighlightOrchestrator**: ハイライト要求の取りまとめ

pub mod builder;
pub mod document_host;
pub mod host_session;
pub mod orchestrator;
pub mod registry;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::document_host::{DocumentHost, FILES_ROUTE, FileContents};
pub use self::host_session::{HostSession, HostState};
pub use self::orchestrator::HighlightOrchestrator;
pub use self::registry::ArtifactRegistry;
