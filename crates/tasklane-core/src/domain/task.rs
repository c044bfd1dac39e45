//! Task model and the request shapes derived from it.
//!
//! Field names and enum values are bit-exact with the remote store's JSON:
//! `id, title, description, priority, dueDate, column, order` and
//! `HIGH | MEDIUM | LOW`.

use serde::{Deserialize, Deserializer, Serialize};

use super::ids::{ColumnId, TaskId};

/// Column a new task lands in when the form does not say otherwise.
pub const DEFAULT_COLUMN: &str = "todo";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// A task as stored remotely.
///
/// `order` is a client-computed rank that only means something relative to
/// other tasks in the same column. A missing order sorts as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    pub column: ColumnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl Task {
    /// Rank used for display ordering.
    pub fn sort_key(&self) -> f64 {
        self.order.unwrap_or(0.0)
    }

    /// Case-insensitive substring match over title and description.
    /// A blank term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term) || self.description.to_lowercase().contains(&term)
    }

    /// Apply a partial update in place. Absent fields are left untouched.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = &patch.due_date {
            self.due_date = due_date.clone();
        }
        if let Some(column) = &patch.column {
            self.column = column.clone();
        }
        if let Some(order) = patch.order {
            self.order = Some(order);
        }
    }
}

/// A task before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    pub column: ColumnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, column: impl Into<ColumnId>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            due_date: None,
            column: column.into(),
            order: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            column: self.column,
            order: self.order,
        }
    }
}

/// Partial update. Only present fields are serialized, so a move sends exactly
/// `{"column": .., "order": ..}`.
///
/// `due_date` is doubly optional: `Some(None)` clears the date (sent as `null`),
/// `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub due_date: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl TaskPatch {
    /// The patch a drag-and-drop move persists.
    pub fn move_to(column: ColumnId, order: f64) -> Self {
        Self {
            column: Some(column),
            order: Some(order),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// What the add/edit form produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub column: ColumnId,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: None,
            priority: Priority::Medium,
            column: ColumnId::new(DEFAULT_COLUMN),
        }
    }
}

impl TaskForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Blank titles never reach the network.
    pub fn has_blank_title(&self) -> bool {
        self.title.trim().is_empty()
    }

    /// Form pre-filled from an existing task (edit dialog).
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.clone(),
            priority: task.priority,
            column: task.column.clone(),
        }
    }

    /// Full-form patch sent when saving an edit. Order is left alone.
    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            priority: Some(self.priority),
            due_date: Some(self.due_date.clone()),
            column: Some(self.column.clone()),
            order: None,
        }
    }

    pub fn to_new_task(&self, column: ColumnId, order: f64) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            due_date: self.due_date.clone(),
            column,
            order: Some(order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_uses_wire_field_names() {
        let task = NewTask::new("Write docs", "todo")
            .with_priority(Priority::High)
            .with_order(1000.0)
            .into_task(TaskId::new("7"));

        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["id"], "7");
        assert_eq!(v["priority"], "HIGH");
        assert_eq!(v["dueDate"], serde_json::Value::Null);
        assert_eq!(v["column"], "todo");
        assert_eq!(v["order"], 1000.0);
    }

    #[test]
    fn task_without_order_deserializes() {
        let task: Task = serde_json::from_value(json!({
            "id": "1",
            "title": "API integration",
            "description": "Connect frontend",
            "priority": "LOW",
            "dueDate": null,
            "column": "todo"
        }))
        .unwrap();
        assert_eq!(task.order, None);
        assert_eq!(task.sort_key(), 0.0);
        assert_eq!(task.priority, Priority::Low);
    }

    #[test]
    fn move_patch_only_carries_column_and_order() {
        let patch = TaskPatch::move_to(ColumnId::new("doing"), 3000.0);
        let v = serde_json::to_value(&patch).unwrap();
        assert_eq!(v, json!({ "column": "doing", "order": 3000.0 }));
    }

    #[test]
    fn patch_distinguishes_cleared_and_absent_due_date() {
        let cleared: TaskPatch = serde_json::from_value(json!({ "dueDate": null })).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let absent: TaskPatch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.due_date, None);
        assert!(absent.is_empty());
    }

    #[test]
    fn apply_leaves_absent_fields_alone() {
        let mut task = NewTask::new("A", "todo")
            .with_description("keep me")
            .with_order(1000.0)
            .into_task(TaskId::new("a"));

        task.apply(&TaskPatch::move_to(ColumnId::new("done"), 1500.0));

        assert_eq!(task.column, "done");
        assert_eq!(task.order, Some(1500.0));
        assert_eq!(task.description, "keep me");
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let task = NewTask::new("Authentication flow", "todo")
            .with_description("login screens")
            .into_task(TaskId::new("6"));

        assert!(task.matches_search("auth"));
        assert!(task.matches_search("  LOGIN "));
        assert!(task.matches_search(""));
        assert!(!task.matches_search("upload"));
    }

    #[test]
    fn blank_form_title_is_detected() {
        assert!(TaskForm::new("   ").has_blank_title());
        assert!(!TaskForm::new("x").has_blank_title());
        assert_eq!(TaskForm::default().priority, Priority::Medium);
        assert_eq!(TaskForm::default().column, DEFAULT_COLUMN);
    }
}
