/// Task filtering for the board view (priority / assignee / due date).
/// Pure: produces filtered clones, never mutates board state.
use chrono::NaiveDate;

use crate::types::{ColumnWithTasks, Priority, Task};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    /// Match any of these priorities; empty means all.
    pub priorities: Vec<Priority>,
    pub assignee: Option<String>,
    /// Inclusive upper bound on the due date.
    pub due_before: Option<NaiveDate>,
    pub overdue_only: bool,
}

impl TaskFilter {
    /// A filter that matches everything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }
        if let Some(assignee) = &self.assignee {
            if task.assignee.as_deref() != Some(assignee.as_str()) {
                return false;
            }
        }
        if let Some(bound) = self.due_before {
            match task.due_date {
                Some(d) if d <= bound => {}
                _ => return false,
            }
        }
        if self.overdue_only && !task.is_overdue(today) {
            return false;
        }
        true
    }
}

/// Filtered clone of the column collection; column structure is preserved,
/// only non-matching tasks are dropped.
pub fn filter_columns(
    columns: &[ColumnWithTasks],
    filter: &TaskFilter,
    today: NaiveDate,
) -> Vec<ColumnWithTasks> {
    if filter.is_empty() {
        return columns.to_vec();
    }
    columns
        .iter()
        .map(|col| {
            let mut filtered = col.clone();
            filtered.tasks.retain(|t| filter.matches(t, today));
            filtered
        })
        .collect()
}
