pub mod controller;
pub mod engine;
pub mod rows;

pub use controller::DragController;
pub use engine::{apply_move, array_move, MoveCommand, ReorderEngine};
pub use rows::{apply_sort_keys, plan_row_reorder, DashboardController};
