//! Board - wiring and the gesture-level API.
//!
//! # Design
//! - `BoardBuilder` validates configuration up front (fail-fast) and returns a
//!   `BuildError` naming the problem
//! - `Board` owns the cache, resolver, drag coordinator, dispatcher and search box
//! - Every read uses the settled search term, passed down explicitly
//!
//! # Example
//! ```ignore
//! let mut board = BoardBuilder::new(InMemoryTransport::new())
//!     .config(BoardConfig::default())
//!     .build()?;
//! board.refresh().await?;
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::cache::{CacheStatus, ColumnCacheStore};
use crate::app::dispatcher::{EditingContext, MutationDispatcher};
use crate::app::drag::{DragCoordinator, DropOutcome, DropTargetId, Point};
use crate::app::resolver::{ColumnSnapshot, SnapshotResolver};
use crate::app::search::SearchBox;
use crate::config::BoardConfig;
use crate::domain::{CacheKey, ColumnConfig, ColumnId, Result, Task, TaskForm, TaskId};
use crate::impls::RetryingTransport;
use crate::ports::TaskTransport;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("board has no columns")]
    NoColumns,

    #[error("column {0} is configured more than once")]
    DuplicateColumn(ColumnId),

    #[error("page size must be at least 1")]
    ZeroPageSize,
}

pub struct BoardBuilder<T> {
    transport: T,
    config: BoardConfig,
}

impl<T: TaskTransport + 'static> BoardBuilder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: BoardConfig::default(),
        }
    }

    pub fn config(mut self, config: BoardConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and wire the board.
    ///
    /// # Checks
    /// - at least one column
    /// - column ids are unique
    /// - page size is non-zero
    pub fn build(self) -> std::result::Result<Board, BuildError> {
        let config = self.config;
        if config.columns.is_empty() {
            return Err(BuildError::NoColumns);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = config.columns.iter().find(|c| !seen.insert(&c.id)) {
            return Err(BuildError::DuplicateColumn(dup.id.clone()));
        }
        if config.page_size == 0 {
            return Err(BuildError::ZeroPageSize);
        }

        let transport: Arc<dyn TaskTransport> = if config.read_retries > 0 {
            Arc::new(RetryingTransport::new(self.transport, config.retry_policy()))
        } else {
            Arc::new(self.transport)
        };
        let columns: Arc<[ColumnConfig]> = config.columns.clone().into();
        let cache = Arc::new(ColumnCacheStore::new(transport.clone(), config.page_size));
        let resolver = Arc::new(SnapshotResolver::new(cache.clone(), columns));
        let drag = DragCoordinator::new(resolver.clone(), config.drag_activation_px)
            .with_same_column_reorder(config.allow_same_column_reorder);
        let dispatcher = MutationDispatcher::new(transport, cache.clone(), resolver.clone());
        let search = SearchBox::new(config.search_debounce());

        Ok(Board {
            config,
            cache,
            resolver,
            drag,
            dispatcher,
            search,
        })
    }
}

pub struct Board {
    config: BoardConfig,
    cache: Arc<ColumnCacheStore>,
    resolver: Arc<SnapshotResolver>,
    drag: DragCoordinator,
    dispatcher: MutationDispatcher,
    search: SearchBox,
}

impl Board {
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn drag(&self) -> &DragCoordinator {
        &self.drag
    }

    pub fn search(&self) -> &SearchBox {
        &self.search
    }

    /// Settled search term every read is scoped to.
    pub fn search_term(&self) -> String {
        self.search.settled()
    }

    fn key(&self, column: &ColumnId) -> CacheKey {
        CacheKey::column_tasks(column.clone(), &self.search_term())
    }

    // --- reads ---

    /// Load page 1 of every column that is missing or stale.
    ///
    /// All columns are attempted; the first failure is returned.
    pub async fn refresh(&self) -> Result<()> {
        let mut first_err = None;
        for column in self.resolver.columns() {
            if let Err(err) = self.cache.ensure_loaded(&self.key(&column.id)).await
                && first_err.is_none()
            {
                first_err = Some(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Infinite-scroll trigger for one column.
    pub async fn load_more(&self, column: &ColumnId) -> Result<bool> {
        self.cache.ensure_next_page(&self.key(column)).await
    }

    pub fn snapshot(&self) -> Vec<ColumnSnapshot> {
        self.resolver.resolve_board(&self.search_term())
    }

    pub fn column(&self, column: &ColumnId) -> Vec<Task> {
        self.resolver.resolve(column, &self.search_term())
    }

    pub fn status(&self, column: &ColumnId) -> CacheStatus {
        self.cache.status(&self.key(column))
    }

    pub async fn total_count(&self) -> usize {
        self.cache.total_count().await
    }

    // --- search ---

    pub fn type_search(&mut self, raw: impl Into<String>) {
        self.search.update(raw);
    }

    /// Settle the typed term immediately (e.g. on Enter).
    pub fn submit_search(&mut self) {
        self.search.flush();
    }

    // --- gestures ---

    pub fn pointer_down(&mut self, task_id: TaskId, at: Point) {
        self.drag.pointer_down(task_id, at);
    }

    pub fn pointer_move(&mut self, to: Point) -> bool {
        let search = self.search_term();
        self.drag.pointer_move(to, &search)
    }

    /// Release without a drag. Returns the clicked task, if any.
    pub fn pointer_up(&mut self) -> Option<TaskId> {
        self.drag.pointer_up()
    }

    pub fn drag_over(&mut self, target: Option<&DropTargetId>) {
        let search = self.search_term();
        self.drag.drag_over(target, &search);
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Finish the drag over `target` and persist a resulting move.
    pub async fn drop_on(&mut self, target: Option<&DropTargetId>) -> Result<DropOutcome> {
        let search = self.search_term();
        let outcome = self.drag.drop(target, &search);
        match &outcome {
            DropOutcome::Move(request) => {
                self.dispatcher.move_task(request, &search).await?;
                self.reload_after_write().await;
            }
            other => info!(outcome = ?other, "drop produced no move"),
        }
        Ok(outcome)
    }

    // --- dialogs ---

    pub async fn save_task(&self, form: &TaskForm, editing: &EditingContext) -> Result<Task> {
        let saved = self.dispatcher.save_task(form, editing, &self.search_term()).await?;
        self.reload_after_write().await;
        Ok(saved)
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<()> {
        self.dispatcher.delete_task(id).await?;
        self.reload_after_write().await;
        Ok(())
    }

    async fn reload_after_write(&self) {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "reload after write failed");
        }
    }
}
