//! cellmark-core
//!
//! スプレッドシートを外部の Office Viewer に配信し、質問への回答で引用された
//! セル範囲をハイライトしたコピーを管理するためのコア部品です。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ファイル名と命名規則, ハイライト要求, FileInfo, errors）
//! - **ports**: 抽象化レイヤー（FileStore, HighlightExecutor, TunnelDiscovery, Clock, など）
//! - **app**: アプリケーションロジック（builder, document_host, orchestrator, registry）
//! - **impls**: 実装（LocalFileStore, ProcessHighlightExecutor, NgrokTunnelDiscovery, fakes）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
