//! RetryingTransport - transport 層での読み取り再試行
//!
//! 読み取り（`list`, `count`）は固定間隔で決まった回数だけ自動再試行します。
//! 書き込みはそのまま素通しし、失敗した create/update/delete は
//! 利用者の操作でやり直します。

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{BoardError, ColumnId, NewTask, PageEnvelope, Result, Task, TaskId, TaskPatch};
use crate::ports::TaskTransport;

/// Retry policy for failed reads: a fixed number of retries, a fixed delay.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt.
    pub max_retries: u32,

    /// Pause before each retry.
    pub delay: Duration,
}

impl RetryPolicy {
    /// One retry after `delay`.
    pub fn single(delay: Duration) -> Self {
        Self {
            max_retries: 1,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single(Duration::from_millis(200))
    }
}

/// Wraps a transport and retries failed reads according to a [`RetryPolicy`].
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: TaskTransport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn pause_before(&self, retry: u32, operation: &'static str, err: &BoardError) {
        let delay = self.policy.delay;
        warn!(operation, retry, ?delay, error = %err, "read failed, retrying");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<T: TaskTransport> TaskTransport for RetryingTransport<T> {
    async fn list(
        &self,
        column: &ColumnId,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PageEnvelope> {
        let mut retry = 0;
        loop {
            match self.inner.list(column, search, page, per_page).await {
                Err(err) if err.is_operation_failure() && retry < self.policy.max_retries => {
                    retry += 1;
                    self.pause_before(retry, "list", &err).await;
                }
                result => return result,
            }
        }
    }

    async fn count(&self) -> Result<usize> {
        let mut retry = 0;
        loop {
            match self.inner.count().await {
                Err(err) if err.is_operation_failure() && retry < self.policy.max_retries => {
                    retry += 1;
                    self.pause_before(retry, "count", &err).await;
                }
                result => return result,
            }
        }
    }

    async fn create(&self, task: NewTask) -> Result<Task> {
        self.inner.create(task).await
    }

    async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        self.inner.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::inmem_transport::{InMemoryTransport, Operation};

    fn retrying(store: &InMemoryTransport) -> RetryingTransport<InMemoryTransport> {
        RetryingTransport::new(store.clone(), RetryPolicy::single(Duration::ZERO))
    }

    #[tokio::test(start_paused = true)]
    async fn every_retry_waits_the_same_delay() {
        let store = InMemoryTransport::new();
        let policy = RetryPolicy {
            max_retries: 3,
            delay: Duration::from_millis(100),
        };
        let transport = RetryingTransport::new(store.clone(), policy);
        store.fail_next(Operation::Count, 3);

        let started = tokio::time::Instant::now();
        transport.count().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(300));
        assert_eq!(store.counts().count, 4);
    }

    #[tokio::test]
    async fn read_is_retried_exactly_once() {
        let store = InMemoryTransport::new();
        let transport = retrying(&store);

        store.fail_next(Operation::Count, 1);
        assert_eq!(transport.count().await.unwrap(), 0);
        assert_eq!(store.counts().count, 2);

        store.fail_next(Operation::List, 2);
        let err = transport.list(&ColumnId::new("todo"), "", 1, 5).await;
        assert!(err.is_err());
        assert_eq!(store.counts().list, 2);
    }

    #[tokio::test]
    async fn mutations_are_never_retried() {
        let store = InMemoryTransport::new();
        let transport = retrying(&store);

        store.fail_next(Operation::Create, 1);
        assert!(transport.create(NewTask::new("x", "todo")).await.is_err());
        assert_eq!(store.counts().create, 1);
        assert!(store.all_tasks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_the_policy_delay_before_retrying() {
        let store = InMemoryTransport::new();
        let transport = RetryingTransport::new(store.clone(), RetryPolicy::single(Duration::from_millis(200)));
        store.fail_next(Operation::Count, 1);

        let started = tokio::time::Instant::now();
        transport.count().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));
    }
}
