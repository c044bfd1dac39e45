//! DragCoordinator - pointer gesture to move intent.
//!
//! # Phases
//! ```text
//! Idle --pointer_down--> Pending --moved > threshold--> Dragging --drop/cancel--> Idle
//!                           \--pointer_up (click)--> Idle
//! ```
//!
//! Everything here is synchronous. Positions are computed from the visible
//! lists (the snapshot resolver), never from the full server-side column.
//! The dragged task is left out when computing indicator positions.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::app::resolver::{ColumnSnapshot, SnapshotResolver, locate_in};
use crate::domain::{ColumnId, Task, TaskId};

/// Pointer position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Whatever the pointer is over: a column body or a task card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTargetId {
    Column(ColumnId),
    Task(TaskId),
}

/// Where a drop would insert, as an index into the visible list of the column
/// with the dragged task removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropIndicator {
    pub column_id: ColumnId,
    pub index: usize,
}

/// A cross-column move the dispatcher should persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRequest {
    pub task_id: TaskId,
    pub target_column: ColumnId,
    pub target_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Move(MoveRequest),
    /// Released outside any column or card.
    NoTarget,
    /// Released over the column the task came from.
    SameColumn,
    /// The dragged task is not in any loaded list.
    SourceUnknown,
    /// No drag was active.
    NotDragging,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragPhase {
    Idle,
    Pending { task_id: TaskId, origin: Point },
    Dragging { task_id: TaskId },
}

pub struct DragCoordinator {
    resolver: Arc<SnapshotResolver>,
    activation_distance: f64,
    allow_same_column_reorder: bool,
    phase: DragPhase,
    active_task: Option<Task>,
    hovered_column: Option<ColumnId>,
    indicator: Option<DropIndicator>,
}

impl DragCoordinator {
    pub fn new(resolver: Arc<SnapshotResolver>, activation_distance: f64) -> Self {
        Self {
            resolver,
            activation_distance,
            allow_same_column_reorder: false,
            phase: DragPhase::Idle,
            active_task: None,
            hovered_column: None,
            indicator: None,
        }
    }

    pub fn with_same_column_reorder(mut self, allow: bool) -> Self {
        self.allow_same_column_reorder = allow;
        self
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Task rendered in the drag overlay. `None` if it was not found on activation.
    pub fn active_task(&self) -> Option<&Task> {
        self.active_task.as_ref()
    }

    pub fn hovered_column(&self) -> Option<&ColumnId> {
        self.hovered_column.as_ref()
    }

    pub fn drop_indicator(&self) -> Option<&DropIndicator> {
        self.indicator.as_ref()
    }

    /// Press on a task card. Ignored while another gesture is in progress.
    pub fn pointer_down(&mut self, task_id: TaskId, at: Point) {
        if self.phase == DragPhase::Idle {
            self.phase = DragPhase::Pending { task_id, origin: at };
        }
    }

    /// Pointer moved. Returns `true` when this move activated the drag.
    pub fn pointer_move(&mut self, to: Point, search: &str) -> bool {
        let DragPhase::Pending { task_id, origin } = &self.phase else {
            return false;
        };
        if origin.distance_to(to) <= self.activation_distance {
            return false;
        }
        let task_id = task_id.clone();
        self.activate(task_id, search);
        true
    }

    /// Release before activation: a click. Returns the clicked task.
    pub fn pointer_up(&mut self) -> Option<TaskId> {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Pending { task_id, .. } => Some(task_id),
            other => {
                self.phase = other;
                None
            }
        }
    }

    fn activate(&mut self, task_id: TaskId, search: &str) {
        let board = self.resolver.resolve_board(search);
        self.active_task = locate_in(&board, &task_id).map(|found| found.task);
        debug!(task = %task_id, found = self.active_task.is_some(), "drag started");
        self.phase = DragPhase::Dragging { task_id };
    }

    fn dragged_id(&self) -> Option<&TaskId> {
        match &self.phase {
            DragPhase::Dragging { task_id } => Some(task_id),
            _ => None,
        }
    }

    /// Pointer moved over `target` (or over nothing) while dragging.
    pub fn drag_over(&mut self, target: Option<&DropTargetId>, search: &str) {
        let Some(dragged) = self.dragged_id().cloned() else {
            return;
        };
        let board = self.resolver.resolve_board(search);
        let indicator = target.and_then(|t| indicator_for(&board, t, &dragged));

        self.hovered_column = indicator.as_ref().map(|i| i.column_id.clone());
        if self.indicator != indicator {
            debug!(?indicator, "drop indicator moved");
        }
        self.indicator = indicator;
    }

    /// Release while dragging. All ephemeral state is cleared before deciding.
    pub fn drop(&mut self, target: Option<&DropTargetId>, search: &str) -> DropOutcome {
        let Some(dragged) = self.dragged_id().cloned() else {
            self.reset();
            return DropOutcome::NotDragging;
        };
        let indicator = self.indicator.take();
        self.reset();

        let Some(target) = target else {
            return DropOutcome::NoTarget;
        };
        let board = self.resolver.resolve_board(search);
        let Some(target_column) = column_of_target(&board, target) else {
            return DropOutcome::NoTarget;
        };
        let Some(source) = board.iter().find(|c| c.contains(&dragged)) else {
            return DropOutcome::SourceUnknown;
        };
        let onto_itself = matches!(target, DropTargetId::Task(id) if id == &dragged);
        if source.id() == target_column.id() && (onto_itself || !self.allow_same_column_reorder) {
            return DropOutcome::SameColumn;
        }

        let target_index = match indicator {
            Some(i) if &i.column_id == target_column.id() => i.index,
            _ => target_column.without(Some(&dragged)).count(),
        };
        DropOutcome::Move(MoveRequest {
            task_id: dragged,
            target_column: target_column.id().clone(),
            target_index,
        })
    }

    /// Abort the gesture with no side effect.
    pub fn cancel(&mut self) {
        if self.phase != DragPhase::Idle {
            debug!("drag cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = DragPhase::Idle;
        self.active_task = None;
        self.hovered_column = None;
        self.indicator = None;
    }
}

fn column_of_target<'a>(board: &'a [ColumnSnapshot], target: &DropTargetId) -> Option<&'a ColumnSnapshot> {
    match target {
        DropTargetId::Column(id) => board.iter().find(|c| c.id() == id),
        DropTargetId::Task(id) => board.iter().find(|c| c.contains(id)),
    }
}

fn indicator_for(board: &[ColumnSnapshot], target: &DropTargetId, dragged: &TaskId) -> Option<DropIndicator> {
    let column = column_of_target(board, target)?;
    let index = match target {
        DropTargetId::Column(_) => column.without(Some(dragged)).count(),
        // Over the dragged card itself this is its current slot.
        DropTargetId::Task(over) => column
            .tasks
            .iter()
            .take_while(|t| &t.id != over)
            .filter(|t| &t.id != dragged)
            .count(),
    };
    Some(DropIndicator {
        column_id: column.id().clone(),
        index,
    })
}
