//! TaskTransport port - リモートのタスクストア
//!
//! エンジンが読み書きするものはすべてこの trait を通ります。
//! 本番の REST 実装はこのクレートの外にあり、`impls` の InMemory 実装が
//! テストとデモ CLI 向けに同じ契約を満たします。
//!
//! # 契約
//! - `list`: 1 カラム分のタスクを `order` 昇順で返す。検索語（trim・大文字小文字無視）で
//!   絞り込み、ページネーションのエンベロープに包む。`next == None` は最終ページ
//! - `count`: 1 件/ページで page 1 を `list` し、`items` を読む
//! - `update` は部分パッチ、`delete` は未知の id で失敗
//!
//! # エラー
//! - 非 2xx 応答: [`BoardError::Fetch`](crate::domain::BoardError::Fetch)
//! - 接続失敗: [`BoardError::Transport`](crate::domain::BoardError::Transport)

use async_trait::async_trait;

use crate::domain::{ColumnId, NewTask, PageEnvelope, Result, Task, TaskId, TaskPatch};

/// TaskTransport はタスクの正本への唯一の入口
///
/// # 設計原則
/// - 読み取り（list/count）は冪等なので再試行してよい
/// - 書き込み（create/update/delete）は再試行しない。失敗したら利用者が操作し直す
#[async_trait]
pub trait TaskTransport: Send + Sync {
    /// One page (1-based) of a column's tasks.
    async fn list(
        &self,
        column: &ColumnId,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PageEnvelope>;

    /// Total number of tasks across all columns.
    async fn count(&self) -> Result<usize>;

    async fn create(&self, task: NewTask) -> Result<Task>;

    async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task>;

    async fn delete(&self, id: &TaskId) -> Result<()>;
}
