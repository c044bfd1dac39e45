//! tasklane-core
//!
//! ページネーション付きカンバンボードのクライアント側エンジン。
//! カラム単位のキャッシュ、スナップショット解決、ドラッグ&ドロップ、
//! 並び順キーの割り当てを担います。
//!
//! # モジュール構成
//! - **domain**: データモデル（ID、タスク、カラム、ページ、キャッシュキー、並び順、エラー）
//! - **ports**: 外部への抽象（TaskTransport, Clock, IdGenerator）
//! - **impls**: InMemoryTransport, RetryingTransport
//! - **app**: キャッシュ、リゾルバ、ドラッグ、ディスパッチャ、検索、ボード
//! - **config**: TOML のボード設定
//! - **observability**: リクエストカウンタ

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{Board, BoardBuilder};
pub use config::BoardConfig;
pub use domain::{BoardError, Result};
