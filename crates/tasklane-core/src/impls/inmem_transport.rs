//! InMemoryTransport - a task store that lives in process memory.
//!
//! Implements the [`TaskTransport`] contract with json-server semantics:
//! list sorted by `order`, pagination envelope, search over title and
//! description, server-assigned ids.
//!
//! Besides the contract it offers hooks the engine's tests need:
//! - request counters ([`RequestCounts`])
//! - a hold gate that keeps list requests pending until released
//! - fault injection per operation

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{BoardError, ColumnId, NewTask, PageEnvelope, Result, Task, TaskId, TaskPatch};
use crate::observability::RequestCounts;
use crate::ports::{IdGenerator, SequentialIdGenerator, TaskTransport};

/// Transport operations, used to target fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Count,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Count => "count",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

#[derive(Default)]
struct StoreState {
    /// Insertion order doubles as the tie-breaker for equal `order` values.
    tasks: Vec<Task>,
    counts: RequestCounts,
    /// Remaining injected failures per operation.
    faults: HashMap<Operation, u32>,
    offline: bool,
}

impl StoreState {
    /// Count the request and consume an injected failure if one is armed.
    fn admit(&mut self, op: Operation) -> Result<()> {
        match op {
            Operation::List => self.counts.list += 1,
            Operation::Count => self.counts.count += 1,
            Operation::Create => self.counts.create += 1,
            Operation::Update => self.counts.update += 1,
            Operation::Delete => self.counts.delete += 1,
        }
        if self.offline {
            return Err(BoardError::transport(op.name(), "store is offline"));
        }
        if let Some(remaining) = self.faults.get_mut(&op)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(BoardError::fetch(op.name(), "injected failure (status 500)"));
        }
        Ok(())
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }
}

/// In-memory task store.
///
/// Cloning shares the same store, so a test can keep a handle while the board
/// owns another.
#[derive(Clone)]
pub struct InMemoryTransport {
    state: Arc<Mutex<StoreState>>,
    ids: Arc<dyn IdGenerator>,
    hold: Arc<watch::Sender<bool>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(SequentialIdGenerator::default()))
    }

    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        let (hold, _) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            ids,
            hold: Arc::new(hold),
        }
    }

    /// Store pre-populated with `tasks`, keeping their ids.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let transport = Self::new();
        transport.lock().tasks.extend(tasks);
        transport
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a task directly, bypassing counters and faults.
    pub fn insert(&self, task: Task) {
        self.lock().tasks.push(task);
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        let state = self.lock();
        state.position(id).map(|i| state.tasks[i].clone())
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn counts(&self) -> RequestCounts {
        self.lock().counts.clone()
    }

    /// Make the next `times` calls of `op` fail with a fetch failure.
    pub fn fail_next(&self, op: Operation, times: u32) {
        self.lock().faults.insert(op, times);
    }

    /// While offline every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Park list requests until [`release`](Self::release) is called.
    pub fn hold(&self) {
        self.hold.send_replace(true);
    }

    pub fn release(&self) {
        self.hold.send_replace(false);
    }

    async fn wait_if_held(&self) {
        let mut rx = self.hold.subscribe();
        // The sender lives as long as `self`, so this only returns once released.
        let _ = rx.wait_for(|held| !*held).await;
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskTransport for InMemoryTransport {
    async fn list(
        &self,
        column: &ColumnId,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PageEnvelope> {
        self.lock().admit(Operation::List)?;
        self.wait_if_held().await;

        let state = self.lock();
        let mut matching: Vec<&Task> = state
            .tasks
            .iter()
            .filter(|t| &t.column == column && t.matches_search(search))
            .collect();
        matching.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));

        let total = matching.len();
        let per_page = per_page.max(1);
        let page = page.max(1);
        let start = ((page - 1) * per_page) as usize;
        let data = matching
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect();
        Ok(PageEnvelope::slice(data, page, per_page, total))
    }

    async fn count(&self) -> Result<usize> {
        let mut state = self.lock();
        state.admit(Operation::Count)?;
        Ok(state.tasks.len())
    }

    async fn create(&self, task: NewTask) -> Result<Task> {
        let mut state = self.lock();
        state.admit(Operation::Create)?;
        let created = task.into_task(self.ids.generate_task_id());
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        let mut state = self.lock();
        state.admit(Operation::Update)?;
        let index = state
            .position(id)
            .ok_or_else(|| BoardError::TaskNotFound(id.clone()))?;
        let task = &mut state.tasks[index];
        task.apply(&patch);
        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        let mut state = self.lock();
        state.admit(Operation::Delete)?;
        let index = state
            .position(id)
            .ok_or_else(|| BoardError::TaskNotFound(id.clone()))?;
        state.tasks.remove(index);
        Ok(())
    }
}
