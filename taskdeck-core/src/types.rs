use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Task priority. Serialized lowercase to match the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A unit of work. Owned by exactly one column at a time; everything except
/// `id` and `column_id` is opaque to the reorder machinery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub column_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Persisted position key. May be sparse; the owning column's task
    /// vector order is authoritative for display.
    #[serde(default)]
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A task is overdue when its due date lies strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date.map(|d| d < today).unwrap_or(false)
    }
}

/// A named ordered bucket of tasks (a board column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnWithTasks {
    pub id: String,
    pub board_id: String,
    pub title: String,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A board label (text + palette color), attachable to any number of boards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: String,
    pub text: String,
    pub color: String,
}

/// Board metadata row: title, color, dashboard sort key, labels and the
/// monetary tracking values edited inline on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    /// Floating sort key; dashboard rows are ordered ascending by this.
    #[serde(default)]
    pub sort_order: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub upcoming_value: f64,
    #[serde(default)]
    pub received_value: f64,
    #[serde(default)]
    pub retainer_y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A board together with its columns and their tasks. The unit the storage
/// layer reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDocument {
    pub board: Board,
    #[serde(default)]
    pub columns: Vec<ColumnWithTasks>,
}

impl BoardDocument {
    /// Total task count across all columns.
    pub fn total_tasks(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    /// Find the column holding a task, along with the task's index within it.
    pub fn find_task(&self, task_id: &str) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(ci, col)| {
            col.tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|ti| (ci, ti))
        })
    }
}

/// Summary info for a board in list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub sort_order: f64,
    pub total_tasks: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    pub total_value: f64,
    pub upcoming_value: f64,
    pub received_value: f64,
    pub retainer_y: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoardSummary {
    pub fn from_document(doc: &BoardDocument) -> Self {
        let b = &doc.board;
        Self {
            id: b.id.clone(),
            title: b.title.clone(),
            description: b.description.clone(),
            color: b.color.clone(),
            sort_order: b.sort_order,
            total_tasks: doc.total_tasks(),
            labels: b.labels.clone(),
            total_value: b.total_value,
            upcoming_value: b.upcoming_value,
            received_value: b.received_value,
            retainer_y: b.retainer_y,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Accepted board/label color classes. Order matters — this is the order
/// pickers present them in.
pub const COLOR_PALETTE: &[&str] = &[
    "bg-blue-500",
    "bg-green-500",
    "bg-yellow-500",
    "bg-red-500",
    "bg-purple-500",
    "bg-pink-500",
    "bg-indigo-500",
    "bg-gray-500",
    "bg-orange-500",
    "bg-teal-500",
    "bg-cyan-500",
    "bg-emerald-500",
];

/// Check whether a color class belongs to the known palette.
pub fn is_known_color(color: &str) -> bool {
    COLOR_PALETTE.contains(&color)
}

/// Default columns for a newly created board, in display order.
pub const DEFAULT_COLUMNS: &[&str] = &["To Do", "In Progress", "Done"];
