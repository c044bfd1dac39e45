//! Domain identifiers (strongly-typed IDs).
//!
//! Task ids are assigned by the remote store and are opaque strings; column ids
//! come from static configuration. Both share one generic wrapper so a column id
//! can never be passed where a task id is expected.
//!
//! The phantom marker costs nothing at runtime: `Id<T>` is exactly a `String`.
//! On the wire both serialize as the bare string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for each id kind.
pub trait IdMarker: Send + Sync + 'static {
    /// Short name used in debug output ("task", "column").
    fn kind() -> &'static str;
}

/// Generic string id.
#[repr(transparent)]
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> PartialEq<str> for Id<T> {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl<T: IdMarker> PartialEq<&str> for Id<T> {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", T::kind(), self.value)
    }
}

impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

// ========================================
// Marker types
// ========================================

/// Marker for task ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {}

impl IdMarker for TaskKind {
    fn kind() -> &'static str {
        "task"
    }
}

/// Marker for column ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKind {}

impl IdMarker for ColumnKind {
    fn kind() -> &'static str {
        "column"
    }
}

/// Identifier of a task (server-assigned).
pub type TaskId = Id<TaskKind>;

/// Identifier of a board column (static configuration).
pub type ColumnId = Id<ColumnKind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_strings() {
        let id = TaskId::new("42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");

        let back: ColumnId = serde_json::from_str("\"in progress\"").unwrap();
        assert_eq!(back, "in progress");
    }

    #[test]
    fn debug_output_names_the_kind() {
        assert_eq!(format!("{:?}", TaskId::new("a")), "task(\"a\")");
        assert_eq!(format!("{:?}", ColumnId::new("todo")), "column(\"todo\")");
        assert_eq!(ColumnId::new("todo").to_string(), "todo");
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<TaskId>(), size_of::<String>());
        assert_eq!(size_of::<ColumnId>(), size_of::<String>());
    }
}
