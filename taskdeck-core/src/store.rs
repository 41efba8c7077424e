/// In-memory board state owned by the UI layer.
///
/// Single owner of the column collection for one open board. The reorder
/// machinery mutates it during a drag session; the data provider replaces it
/// wholesale on load and reload. Subscribers get change notifications over a
/// broadcast channel instead of framework re-render hooks.
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::ColumnWithTasks;

/// Notification emitted on every store mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// The whole collection was swapped (initial load or reload).
    ColumnsReplaced,
    /// The collection was mutated in place (drag preview or move).
    ColumnsMutated,
}

pub struct BoardStore {
    columns: RwLock<Vec<ColumnWithTasks>>,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl BoardStore {
    pub fn new(columns: Vec<ColumnWithTasks>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            columns: RwLock::new(columns),
            event_tx,
        }
    }

    /// Clone of the current column collection.
    pub fn snapshot(&self) -> Vec<ColumnWithTasks> {
        self.columns.read().unwrap().clone()
    }

    /// Swap the whole collection (load / reload-on-error path).
    pub fn replace(&self, columns: Vec<ColumnWithTasks>) {
        *self.columns.write().unwrap() = columns;
        let _ = self.event_tx.send(StoreEvent::ColumnsReplaced);
    }

    /// Mutate the collection in place. Notifies only when `f` reports that it
    /// actually changed something.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Vec<ColumnWithTasks>) -> bool,
    {
        let changed = {
            let mut columns = self.columns.write().unwrap();
            f(&mut columns)
        };
        if changed {
            let _ = self.event_tx.send(StoreEvent::ColumnsMutated);
        }
        changed
    }

    /// Run a read-only closure against the current collection.
    pub fn with_columns<R>(&self, f: impl FnOnce(&[ColumnWithTasks]) -> R) -> R {
        f(&self.columns.read().unwrap())
    }

    /// Subscribe to store change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }
}
