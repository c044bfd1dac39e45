//! Impls - ポートの実装
//!
//! # 含まれる実装
//! - **InMemoryTransport**: プロセス内のタスクストア（テスト、デモ CLI）
//! - **RetryingTransport**: 任意の transport に読み取り再試行を被せるデコレータ
//!
//! 本番の REST transport はエンジンを組み込むアプリケーション側に置きます。

pub mod inmem_transport;
pub mod retrying;

pub use self::inmem_transport::{InMemoryTransport, Operation};
pub use self::retrying::{RetryPolicy, RetryingTransport};
