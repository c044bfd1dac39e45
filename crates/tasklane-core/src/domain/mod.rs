//! Domain model (ids, tasks, columns, pages, cache keys, order keys, errors).
//!
//! Nothing in here performs I/O.

pub mod cache_key;
pub mod column;
pub mod errors;
pub mod ids;
pub mod order;
pub mod page;
pub mod task;

pub use self::cache_key::{CacheEntity, CacheKey, InvalidationScope};
pub use self::column::{ColumnConfig, default_columns};
pub use self::errors::{BoardError, Result};
pub use self::ids::{ColumnId, TaskId};
pub use self::order::{BASE_ORDER, ORDER_GAP, allocate, allocate_among, allocate_sparse, has_headroom};
pub use self::page::{Page, PageEnvelope};
pub use self::task::{NewTask, Priority, Task, TaskForm, TaskPatch};
