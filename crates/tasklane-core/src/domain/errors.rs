//! Error taxonomy for board operations.
//!
//! `Fetch` and `Transport` are both "the operation did not succeed"; callers
//! treat them the same way (see [`BoardError::is_operation_failure`]).
//! `Validation` is client-local and never reaches the network.
//! No variant is fatal: each failure is scoped to the operation that raised it.

use thiserror::Error;

use super::ids::{ColumnId, TaskId};

#[derive(Debug, Error)]
pub enum BoardError {
    /// Non-success response from a list/create/update/delete call.
    #[error("{operation} failed: {message}")]
    Fetch {
        operation: &'static str,
        message: String,
    },

    /// Network or connection failure.
    #[error("transport error during {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// Blocked client-side before any request was made.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("unknown column: {0}")]
    UnknownColumn(ColumnId),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    pub fn fetch(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Fetch {
            operation,
            message: message.into(),
        }
    }

    pub fn transport(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            message: message.into(),
        }
    }

    /// A remote operation did not succeed, for whatever reason.
    pub fn is_operation_failure(&self) -> bool {
        matches!(
            self,
            BoardError::Fetch { .. } | BoardError::Transport { .. } | BoardError::TaskNotFound(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, BoardError::Validation(_))
    }
}

impl From<toml::de::Error> for BoardError {
    fn from(e: toml::de::Error) -> Self {
        BoardError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for BoardError {
    fn from(e: toml::ser::Error) -> Self {
        BoardError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
