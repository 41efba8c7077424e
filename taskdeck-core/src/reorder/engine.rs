/// Drag-and-drop reorder engine.
///
/// Pure state machine translating drag-lifecycle events into local order
/// mutations plus at most one `MoveCommand` per completed drag session.
/// No I/O here — the side-effecting shell lives in `controller`.
use crate::types::ColumnWithTasks;

/// The single persistence-visible effect of a drag session: relocate a task
/// into a column at an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCommand {
    pub task_id: String,
    pub target_column_id: String,
    pub new_index: usize,
}

/// What a drag-over target resolved to.
enum OverTarget {
    /// A task, addressed as (column index, task index).
    Task(usize, usize),
    /// A column id hit directly.
    Column(usize),
}

/// Per-session drag state: `active` is the picked-up task id while a session
/// is live, `None` when idle. At most one session at a time.
#[derive(Debug, Default)]
pub struct ReorderEngine {
    active: Option<String>,
}

impl ReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The task id currently being dragged, if a session is live.
    pub fn active_task_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Begin a drag session. Resolves the task by scanning every column;
    /// an unknown id aborts the session silently.
    pub fn drag_start(&mut self, columns: &[ColumnWithTasks], task_id: &str) -> bool {
        if find_task_position(columns, task_id).is_none() {
            log::debug!(
                "[taskdeck.reorder.start] Unknown task {}, session aborted",
                task_id
            );
            self.active = None;
            return false;
        }
        self.active = Some(task_id.to_string());
        true
    }

    /// Handle a hover event while dragging. Same-column task targets get a
    /// live-preview splice in `columns`; cross-column targets mutate nothing
    /// (membership changes are deferred to `drag_end`). Returns whether
    /// `columns` was mutated.
    pub fn drag_over(&self, columns: &mut [ColumnWithTasks], over_id: &str) -> bool {
        let Some(active_id) = self.active.as_deref() else {
            return false;
        };
        let Some((source_col, active_index)) = find_task_position(columns, active_id) else {
            return false;
        };
        let Some(target) = resolve_over_target(columns, over_id) else {
            return false;
        };

        match target {
            OverTarget::Task(target_col, over_index) if target_col == source_col => {
                if active_index != over_index {
                    array_move(&mut columns[source_col].tasks, active_index, over_index);
                    return true;
                }
                false
            }
            // Cross-column hover or a bare column id: no live mutation.
            _ => false,
        }
    }

    /// End the drag session. Returns a `MoveCommand` only for a completed
    /// cross-column drop; the session returns to idle regardless.
    ///
    /// `over = None` (released outside any droppable zone) ends the session
    /// with no command — local state keeps whatever the last preview
    /// produced. The over-target must be a column id directly at this stage;
    /// anything else is a no-op.
    pub fn drag_end(
        &mut self,
        columns: &[ColumnWithTasks],
        over_id: Option<&str>,
    ) -> Option<MoveCommand> {
        let active_id = self.active.take()?;
        let over_id = over_id?;

        let target = columns.iter().find(|c| c.id == over_id)?;
        let (source_col, _) = find_task_position(columns, &active_id)?;
        let source = &columns[source_col];

        if source.id == target.id {
            // Same column: the live preview is already final. No command.
            return None;
        }

        // Cross-column moves always append to the destination.
        Some(MoveCommand {
            task_id: active_id,
            target_column_id: target.id.clone(),
            new_index: target.tasks.len(),
        })
    }
}

/// Locate a task across all columns: (column index, task index).
pub fn find_task_position(columns: &[ColumnWithTasks], task_id: &str) -> Option<(usize, usize)> {
    columns.iter().enumerate().find_map(|(ci, col)| {
        col.tasks
            .iter()
            .position(|t| t.id == task_id)
            .map(|ti| (ci, ti))
    })
}

fn resolve_over_target(columns: &[ColumnWithTasks], over_id: &str) -> Option<OverTarget> {
    if let Some((ci, ti)) = find_task_position(columns, over_id) {
        return Some(OverTarget::Task(ci, ti));
    }
    columns
        .iter()
        .position(|c| c.id == over_id)
        .map(OverTarget::Column)
}

/// Stable remove-then-insert splice: moves `v[from]` to position `to`,
/// shifting everything in between. Out-of-range indices are a no-op.
pub fn array_move<T>(v: &mut Vec<T>, from: usize, to: usize) {
    if from >= v.len() || to >= v.len() || from == to {
        return;
    }
    let item = v.remove(from);
    v.insert(to, item);
}

/// Apply a `MoveCommand` to a column collection: remove the task from its
/// current column, stamp the new membership, insert at the command's index
/// (clamped to the destination length). Returns whether anything changed —
/// relocating a task to the position it already occupies is a no-op.
pub fn apply_move(columns: &mut [ColumnWithTasks], cmd: &MoveCommand) -> bool {
    let Some((source_col, task_index)) = find_task_position(columns, &cmd.task_id) else {
        return false;
    };
    let Some(target_col) = columns.iter().position(|c| c.id == cmd.target_column_id) else {
        return false;
    };

    if source_col == target_col {
        let len = columns[source_col].tasks.len();
        let to = cmd.new_index.min(len.saturating_sub(1));
        if to == task_index {
            return false;
        }
        array_move(&mut columns[source_col].tasks, task_index, to);
        return true;
    }

    let mut task = columns[source_col].tasks.remove(task_index);
    task.column_id = cmd.target_column_id.clone();
    let insert_at = cmd.new_index.min(columns[target_col].tasks.len());
    columns[target_col].tasks.insert(insert_at, task);
    true
}
