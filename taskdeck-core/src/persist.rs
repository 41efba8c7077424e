use serde::{Deserialize, Serialize};

/// A dashboard row's persisted sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSortKey {
    pub id: String,
    pub sort_order: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflicting update on {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// The persistence service consumed by the drag controllers.
///
/// Calls are issued at most once per completed drag session and are never
/// retried here; failures surface to the caller, which may reload from the
/// provider to reconverge.
pub trait Persistence: Send + Sync {
    /// Relocate a task into a column at an index. Must be safe to call when
    /// the task is already in the target column (repositioning).
    fn move_task(
        &self,
        task_id: &str,
        target_column_id: &str,
        new_index: usize,
    ) -> Result<(), PersistError>;

    /// Persist a full new within-column task order.
    fn reorder_column(
        &self,
        column_id: &str,
        ordered_task_ids: &[String],
    ) -> Result<(), PersistError>;

    /// Persist the dashboard row order as explicit sort keys.
    fn reorder_boards(&self, new_order: &[BoardSortKey]) -> Result<(), PersistError>;
}
