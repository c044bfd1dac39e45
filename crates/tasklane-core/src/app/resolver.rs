//! SnapshotResolver - the visible task list of a column, computed from the cache.
//!
//! Never fetches. Two calls with no cache change in between return identical
//! results.

use std::sync::Arc;

use serde::Serialize;

use crate::app::cache::ColumnCacheStore;
use crate::domain::{CacheKey, ColumnConfig, ColumnId, Task, TaskId};

/// One column as the board shows it right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSnapshot {
    pub config: ColumnConfig,
    pub tasks: Vec<Task>,
}

impl ColumnSnapshot {
    pub fn id(&self) -> &ColumnId {
        &self.config.id
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.tasks.iter().any(|t| &t.id == task_id)
    }

    /// Visible tasks without `excluded`, in display order.
    pub fn without<'a>(&'a self, excluded: Option<&'a TaskId>) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| Some(&t.id) != excluded)
    }
}

/// Where a task currently sits.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub task: Task,
    pub column: ColumnId,
    pub index: usize,
}

pub struct SnapshotResolver {
    cache: Arc<ColumnCacheStore>,
    columns: Arc<[ColumnConfig]>,
}

impl SnapshotResolver {
    pub fn new(cache: Arc<ColumnCacheStore>, columns: Arc<[ColumnConfig]>) -> Self {
        Self { cache, columns }
    }

    pub fn columns(&self) -> &[ColumnConfig] {
        &self.columns
    }

    /// Loaded tasks of `column` under `search`, stable-sorted by order.
    pub fn resolve(&self, column: &ColumnId, search: &str) -> Vec<Task> {
        let mut tasks = self.cache.tasks(&CacheKey::column_tasks(column.clone(), search));
        tasks.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));
        tasks
    }

    /// Every configured column, in configuration order.
    pub fn resolve_board(&self, search: &str) -> Vec<ColumnSnapshot> {
        self.columns
            .iter()
            .map(|config| ColumnSnapshot {
                tasks: self.resolve(&config.id, search),
                config: config.clone(),
            })
            .collect()
    }

    pub fn locate(&self, task_id: &TaskId, search: &str) -> Option<Located> {
        locate_in(&self.resolve_board(search), task_id)
    }
}

/// Find `task_id` in an already resolved board.
pub fn locate_in(board: &[ColumnSnapshot], task_id: &TaskId) -> Option<Located> {
    board.iter().find_map(|column| {
        column
            .tasks
            .iter()
            .position(|t| &t.id == task_id)
            .map(|index| Located {
                task: column.tasks[index].clone(),
                column: column.id().clone(),
                index,
            })
    })
}
