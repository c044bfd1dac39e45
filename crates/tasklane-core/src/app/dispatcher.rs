//! MutationDispatcher - turns user intents into remote writes.
//!
//! # Design
//! - No optimistic updates: the cache only changes through invalidation after
//!   the server confirmed the write
//! - A failed write leaves the cache as it was and is returned to the caller
//! - The search scope and the editing context are explicit arguments

use std::sync::Arc;

use tracing::{info, warn};

use crate::app::cache::ColumnCacheStore;
use crate::app::drag::MoveRequest;
use crate::app::resolver::SnapshotResolver;
use crate::domain::{
    BoardError, ColumnId, InvalidationScope, NewTask, Result, Task, TaskForm, TaskId, TaskPatch, allocate_among,
    has_headroom,
};
use crate::ports::TaskTransport;

/// Which dialog submitted the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditingContext {
    /// "Add task" opened from a column header.
    Creating { column: ColumnId },
    Editing { task_id: TaskId },
}

pub struct MutationDispatcher {
    transport: Arc<dyn TaskTransport>,
    cache: Arc<ColumnCacheStore>,
    resolver: Arc<SnapshotResolver>,
}

impl MutationDispatcher {
    pub fn new(transport: Arc<dyn TaskTransport>, cache: Arc<ColumnCacheStore>, resolver: Arc<SnapshotResolver>) -> Self {
        Self {
            transport,
            cache,
            resolver,
        }
    }

    fn ensure_column(&self, column: &ColumnId) -> Result<()> {
        if self.resolver.columns().iter().any(|c| &c.id == column) {
            Ok(())
        } else {
            Err(BoardError::UnknownColumn(column.clone()))
        }
    }

    /// Order key for inserting at `index` into the visible `column`, ignoring `moving`.
    fn order_for(&self, column: &ColumnId, search: &str, index: usize, moving: Option<&TaskId>) -> f64 {
        let neighbors: Vec<Task> = self
            .resolver
            .resolve(column, search)
            .into_iter()
            .filter(|t| Some(&t.id) != moving)
            .collect();

        if index > 0 && index < neighbors.len() {
            let lo = neighbors[index - 1].sort_key();
            let hi = neighbors[index].sort_key();
            if !has_headroom(lo, hi) {
                warn!(%column, lo, hi, "order keys exhausted between neighbors");
            }
        }
        allocate_among(&neighbors, index)
    }

    /// Persist a drag-and-drop move.
    pub async fn move_task(&self, request: &MoveRequest, search: &str) -> Result<Task> {
        self.ensure_column(&request.target_column)?;
        let order = self.order_for(
            &request.target_column,
            search,
            request.target_index,
            Some(&request.task_id),
        );
        info!(
            task = %request.task_id,
            column = %request.target_column,
            index = request.target_index,
            order,
            "moving task"
        );

        let patch = TaskPatch::move_to(request.target_column.clone(), order);
        self.write("move", self.transport.update(&request.task_id, patch).await)
    }

    pub async fn create_task(&self, task: NewTask) -> Result<Task> {
        if task.title.trim().is_empty() {
            return Err(BoardError::Validation("title must not be blank".into()));
        }
        self.ensure_column(&task.column)?;
        info!(column = %task.column, title = %task.title, "creating task");
        self.write("create", self.transport.create(task).await)
    }

    pub async fn update_task(&self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(BoardError::Validation("title must not be blank".into()));
        }
        if let Some(column) = &patch.column {
            self.ensure_column(column)?;
        }
        info!(task = %id, "updating task");
        self.write("update", self.transport.update(id, patch).await)
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<()> {
        info!(task = %id, "deleting task");
        self.write("delete", self.transport.delete(id).await)
    }

    /// Submit the add/edit dialog.
    ///
    /// New tasks are appended after the last visible task of the target column.
    pub async fn save_task(&self, form: &TaskForm, editing: &EditingContext, search: &str) -> Result<Task> {
        if form.has_blank_title() {
            return Err(BoardError::Validation("title must not be blank".into()));
        }
        match editing {
            EditingContext::Creating { column } => {
                self.ensure_column(column)?;
                let end = self.resolver.resolve(column, search).len();
                let order = self.order_for(column, search, end, None);
                self.create_task(form.to_new_task(column.clone(), order)).await
            }
            EditingContext::Editing { task_id } => self.update_task(task_id, form.to_patch()).await,
        }
    }

    fn write<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.cache.invalidate(InvalidationScope::ColumnTasksAndCount);
                Ok(value)
            }
            Err(err) => {
                warn!(operation, error = %err, "write failed, cache left untouched");
                Err(err)
            }
        }
    }
}
