//! Typed cache keys shared by the cache writer and the snapshot reader.

use std::fmt;

use super::ids::ColumnId;

/// Entity class a cache key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheEntity {
    ColumnTasks,
}

impl CacheEntity {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheEntity::ColumnTasks => "column-tasks",
        }
    }
}

/// Key of one independently paginated view: `(column, search term)`.
///
/// Different search terms are different keys; pages are never shared
/// between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub entity: CacheEntity,
    pub column_id: ColumnId,
    pub search: String,
}

impl CacheKey {
    /// The only constructor, so the search term is normalised the same way
    /// at every call site.
    pub fn column_tasks(column_id: impl Into<ColumnId>, search: &str) -> Self {
        Self {
            entity: CacheEntity::ColumnTasks,
            column_id: column_id.into(),
            search: search.trim().to_string(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{:?}", self.entity.as_str(), self.column_id, self.search)
    }
}

/// What a write invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationScope {
    /// Every column-task key.
    ColumnTasks,
    /// Every column-task key and the aggregate count.
    ColumnTasksAndCount,
}

impl InvalidationScope {
    pub fn includes_count(self) -> bool {
        matches!(self, InvalidationScope::ColumnTasksAndCount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_term_is_part_of_the_key() {
        let plain = CacheKey::column_tasks("todo", "");
        let auth = CacheKey::column_tasks("todo", "auth");
        assert_ne!(plain, auth);
        assert_eq!(auth, CacheKey::column_tasks("todo", "  auth "));
    }

    #[test]
    fn display_is_readable_in_logs() {
        let key = CacheKey::column_tasks("in progress", "auth");
        assert_eq!(key.to_string(), "column-tasks/in progress/\"auth\"");
    }
}
