//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! 各 trait はエンジン外部（リモートのタスクストア、時刻、ID 採番）への
//! インターフェースで、実装は `impls` に置きます。
//!
//! # 設計原則
//! - リモートストアが正本（source of truth）、キャッシュは写しに過ぎない
//! - 書き込みはすべて `TaskTransport` を経由する

pub mod clock;
pub mod id_generator;
pub mod transport;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, SequentialIdGenerator, UlidGenerator};
pub use self::transport::TaskTransport;
