//! IdGenerator port - タスク ID の採番
//!
//! タスク ID はリモートストアが採番します。ストアの代役
//! （InMemory transport、テスト用 fixture）はこの trait 経由で採番します。
//!
//! # 実装
//! - **UlidGenerator**: [`Clock`] を使った時刻順の ULID
//! - **SequentialIdGenerator**: json-server と同じ "1", "2", ... の連番

use std::sync::atomic::{AtomicU64, Ordering};

use ulid::Ulid;

use crate::domain::TaskId;
use crate::ports::Clock;

/// IdGenerator は新規タスクの ID を生成
///
/// `Send + Sync`: 共有される transport の裏で 1 つの generator を使う
pub trait IdGenerator: Send + Sync {
    fn generate_task_id(&self) -> TaskId;
}

/// ULID-based ids, lowercased.
///
/// The timestamp part comes from the clock, so a [`FixedClock`](crate::ports::FixedClock)
/// yields ids that share a prefix but still differ in their random part.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_task_id(&self) -> TaskId {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        TaskId::new(ulid.to_string().to_lowercase())
    }
}

/// Monotonic numeric ids starting at a given value.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_task_id(&self) -> TaskId {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        TaskId::new(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_task_id();
        let id2 = id_gen.generate_task_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 26);
    }

    #[test]
    fn fixed_clock_pins_the_timestamp_part() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id1 = id_gen.generate_task_id();
        let id2 = id_gen.generate_task_id();
        assert_ne!(id1, id2);

        // The first 10 characters of a ULID encode the millisecond timestamp.
        assert_eq!(id1.as_str()[..10], id2.as_str()[..10]);
        let parsed = Ulid::from_string(&id1.as_str().to_uppercase()).unwrap();
        assert_eq!(parsed.timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }

    #[test]
    fn sequential_ids_count_up() {
        let id_gen = SequentialIdGenerator::starting_at(11);
        assert_eq!(id_gen.generate_task_id(), "11");
        assert_eq!(id_gen.generate_task_id(), "12");
    }
}
