pub mod local;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::persist::BoardSortKey;
use crate::types::{Board, BoardDocument, BoardSummary, Label, Priority, Task};

/// Abstract storage trait for board backends.
/// Implementation: LocalStorage (filesystem); the HTTP API sits on top.
pub trait BoardStorage: Send + Sync {
    /// List all boards with summary info, ordered by dashboard sort key.
    fn list_boards(&self) -> Vec<BoardSummary>;

    /// Read a full board document by ID.
    fn read_board(&self, board_id: &str) -> Option<BoardDocument>;

    /// Create a board with the default column set.
    fn create_board(&self, new: NewBoard) -> Result<BoardDocument, StorageError>;

    /// Patch board metadata (title, color, values, labels…).
    fn update_board(&self, board_id: &str, patch: BoardPatch) -> Result<Board, StorageError>;

    /// Delete a board and its document file.
    fn delete_board(&self, board_id: &str) -> Result<(), StorageError>;

    /// Create a task at the end of a column.
    fn create_task(&self, column_id: &str, new: NewTask) -> Result<Task, StorageError>;

    /// Patch task attributes.
    fn update_task(&self, task_id: &str, patch: TaskPatch) -> Result<Task, StorageError>;

    /// Delete a task.
    fn delete_task(&self, task_id: &str) -> Result<(), StorageError>;

    /// Relocate a task to a column at an index. Repositioning a task onto
    /// its current spot is accepted and changes nothing.
    fn move_task(
        &self,
        task_id: &str,
        target_column_id: &str,
        new_index: usize,
    ) -> Result<(), StorageError>;

    /// Replace a column's task order with an explicit permutation.
    fn reorder_column(
        &self,
        column_id: &str,
        ordered_task_ids: &[String],
    ) -> Result<(), StorageError>;

    /// Rewrite dashboard sort keys across boards.
    fn reorder_boards(&self, new_order: &[BoardSortKey]) -> Result<(), StorageError>;

    /// All labels known to this storage.
    fn list_labels(&self) -> Vec<Label>;

    /// Create a label; the color must come from the known palette.
    fn create_label(&self, text: &str, color: &str) -> Result<Label, StorageError>;

    /// Delete a label everywhere (global list and any board carrying it).
    fn delete_label(&self, label_id: &str) -> Result<(), StorageError>;

    /// Replace a board's label set by global label IDs.
    fn set_board_labels(&self, board_id: &str, label_ids: &[String])
        -> Result<Board, StorageError>;
}

/// Request body for creating a board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub label_ids: Vec<String>,
}

/// Partial board update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub total_value: Option<f64>,
    #[serde(default)]
    pub upcoming_value: Option<f64>,
    #[serde(default)]
    pub received_value: Option<f64>,
    #[serde(default)]
    pub retainer_y: Option<f64>,
    #[serde(default)]
    pub started_date: Option<NaiveDate>,
    #[serde(default)]
    pub label_ids: Option<Vec<String>>,
}

/// Request body for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Partial task update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Events emitted when stored boards change, for SSE/subscriber fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangeEvent {
    BoardListChanged,
    BoardChanged { board_id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Label not found: {0}")]
    LabelNotFound(String),

    #[error("Unknown color: {0}")]
    InvalidColor(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for crate::persist::PersistError {
    fn from(e: StorageError) -> Self {
        use crate::persist::PersistError;
        match e {
            StorageError::BoardNotFound(id)
            | StorageError::ColumnNotFound(id)
            | StorageError::TaskNotFound(id)
            | StorageError::LabelNotFound(id) => PersistError::NotFound(id),
            StorageError::Io(e) => PersistError::Io(e),
            other => PersistError::Backend(other.to_string()),
        }
    }
}
