//! Static column configuration.

use serde::{Deserialize, Serialize};

use super::ids::ColumnId;

/// A column's display identity. Columns are not persisted and are never
/// created or destroyed at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub id: ColumnId,
    pub title: String,
    pub color: String,
}

impl ColumnConfig {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            color: color.into(),
        }
    }
}

/// The board's stock columns.
pub fn default_columns() -> Vec<ColumnConfig> {
    vec![
        ColumnConfig::new("todo", "TO DO", "#3b82f6"),
        ColumnConfig::new("in progress", "IN PROGRESS", "#f59e0b"),
        ColumnConfig::new("in review", "IN REVIEW", "#6366f1"),
        ColumnConfig::new("done", "DONE", "#10b981"),
    ]
}
