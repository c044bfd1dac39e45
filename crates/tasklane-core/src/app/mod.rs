//! App - アプリケーション層
//!
//! ポートを組み合わせてボードの振る舞いを作ります。
//!
//! # コンポーネント
//! - **ColumnCacheStore**: (column, search) 単位のページ付きキャッシュ
//! - **SnapshotResolver**: キャッシュから表示用のソート済みカラムを作る
//! - **DragCoordinator**: ポインタ操作を移動の意図に変換
//! - **MutationDispatcher**: 書き込みとキャッシュ無効化
//! - **SearchBox**: デバウンスされた検索語
//! - **BoardBuilder / Board**: 組み立てとジェスチャ単位の API

pub mod board;
pub mod cache;
pub mod dispatcher;
pub mod drag;
pub mod resolver;
pub mod search;

pub use self::board::{Board, BoardBuilder, BuildError};
pub use self::cache::{CacheStatus, ColumnCacheStore};
pub use self::dispatcher::{EditingContext, MutationDispatcher};
pub use self::drag::{DragCoordinator, DragPhase, DropIndicator, DropOutcome, DropTargetId, MoveRequest, Point};
pub use self::resolver::{ColumnSnapshot, Located, SnapshotResolver};
pub use self::search::SearchBox;
