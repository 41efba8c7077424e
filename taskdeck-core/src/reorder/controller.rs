/// Side-effecting shell around the reorder engine.
///
/// Wires drag events to the board store (optimistic local mutation) and the
/// persistence service (one move call per completed cross-column drag).
/// A failed persistence call is surfaced but never rolled back locally —
/// callers that want consistency replace the store from the provider.
use std::sync::{Arc, Mutex};

use crate::persist::{PersistError, Persistence};
use crate::store::BoardStore;
use crate::types::Task;

use super::engine::{apply_move, find_task_position, ReorderEngine};

pub struct DragController<P: Persistence> {
    engine: Mutex<ReorderEngine>,
    store: Arc<BoardStore>,
    persistence: Arc<P>,
}

impl<P: Persistence> DragController<P> {
    pub fn new(store: Arc<BoardStore>, persistence: Arc<P>) -> Self {
        Self {
            engine: Mutex::new(ReorderEngine::new()),
            store,
            persistence,
        }
    }

    /// Begin a drag session. Returns false when the task id resolves to
    /// nothing (the session silently aborts).
    pub fn on_drag_start(&self, task_id: &str) -> bool {
        let mut engine = self.engine.lock().unwrap();
        self.store
            .with_columns(|cols| engine.drag_start(cols, task_id))
    }

    /// Hover event: commit any same-column live preview to the store.
    pub fn on_drag_over(&self, over_id: &str) -> bool {
        let engine = self.engine.lock().unwrap();
        self.store.update(|cols| engine.drag_over(cols, over_id))
    }

    /// Release event. Applies a cross-column move optimistically, then
    /// issues exactly one persistence call. The error from a failed call is
    /// returned as-is; local state keeps the optimistic move.
    pub fn on_drag_end(&self, over_id: Option<&str>) -> Result<(), PersistError> {
        let cmd = {
            let mut engine = self.engine.lock().unwrap();
            self.store.with_columns(|cols| engine.drag_end(cols, over_id))
        };
        let Some(cmd) = cmd else {
            return Ok(());
        };

        self.store.update(|cols| apply_move(cols, &cmd));

        if let Err(e) =
            self.persistence
                .move_task(&cmd.task_id, &cmd.target_column_id, cmd.new_index)
        {
            log::error!(
                "[taskdeck.reorder.commit] Move of {} to {} failed: {}",
                cmd.task_id,
                cmd.target_column_id,
                e
            );
            return Err(e);
        }
        Ok(())
    }

    /// The task currently being dragged (for overlay rendering).
    pub fn active_task(&self) -> Option<Task> {
        let engine = self.engine.lock().unwrap();
        let task_id = engine.active_task_id()?.to_string();
        drop(engine);
        self.store.with_columns(|cols| {
            find_task_position(cols, &task_id).map(|(ci, ti)| cols[ci].tasks[ti].clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::BoardSortKey;
    use crate::types::{ColumnWithTasks, Priority, Task};
    use chrono::Utc;

    /// Records every call; optionally fails them all.
    #[derive(Default)]
    struct RecordingPersistence {
        moves: Mutex<Vec<(String, String, usize)>>,
        fail: bool,
    }

    impl Persistence for RecordingPersistence {
        fn move_task(
            &self,
            task_id: &str,
            target_column_id: &str,
            new_index: usize,
        ) -> Result<(), PersistError> {
            self.moves.lock().unwrap().push((
                task_id.to_string(),
                target_column_id.to_string(),
                new_index,
            ));
            if self.fail {
                return Err(PersistError::Backend("write rejected".to_string()));
            }
            Ok(())
        }

        fn reorder_column(&self, _: &str, _: &[String]) -> Result<(), PersistError> {
            Ok(())
        }

        fn reorder_boards(&self, _: &[BoardSortKey]) -> Result<(), PersistError> {
            Ok(())
        }
    }

    fn make_task(id: &str, column_id: &str) -> Task {
        Task {
            id: id.to_string(),
            column_id: column_id.to_string(),
            title: id.to_string(),
            description: None,
            assignee: None,
            priority: Priority::default(),
            due_date: None,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_columns(layout: &[(&str, &[&str])]) -> Vec<ColumnWithTasks> {
        layout.iter()
            .map(|(col_id, task_ids)| ColumnWithTasks {
                id: col_id.to_string(),
                board_id: "b1".to_string(),
                title: col_id.to_string(),
                sort_order: 0,
                tasks: task_ids.iter().map(|t| make_task(t, col_id)).collect(),
            })
            .collect()
    }

    fn controller(
        layout: &[(&str, &[&str])],
        fail: bool,
    ) -> (DragController<RecordingPersistence>, Arc<BoardStore>) {
        let store = Arc::new(BoardStore::new(make_columns(layout)));
        let persistence = Arc::new(RecordingPersistence {
            fail,
            ..Default::default()
        });
        (DragController::new(store.clone(), persistence), store)
    }

    fn order(store: &BoardStore, col_id: &str) -> Vec<String> {
        store.with_columns(|cols| {
            cols.iter()
                .find(|c| c.id == col_id)
                .unwrap()
                .tasks
                .iter()
                .map(|t| t.id.clone())
                .collect()
        })
    }

    #[test]
    fn test_same_column_drag_persists_nothing() {
        let (ctrl, store) = controller(&[("c1", &["t1", "t2", "t3"]), ("c2", &[])], false);

        assert!(ctrl.on_drag_start("t1"));
        assert!(ctrl.on_drag_over("t3"));
        assert_eq!(order(&store, "c1"), vec!["t2", "t3", "t1"]);
        assert!(order(&store, "c2").is_empty());

        ctrl.on_drag_end(Some("c1")).unwrap();
        assert!(ctrl.persistence.moves.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cross_column_drop_issues_single_move() {
        let (ctrl, store) = controller(&[("c1", &["t1"]), ("c2", &["t5", "t6"])], false);

        assert!(ctrl.on_drag_start("t1"));
        ctrl.on_drag_end(Some("c2")).unwrap();

        assert!(order(&store, "c1").is_empty());
        assert_eq!(order(&store, "c2"), vec!["t5", "t6", "t1"]);
        assert_eq!(
            *ctrl.persistence.moves.lock().unwrap(),
            vec![("t1".to_string(), "c2".to_string(), 2)]
        );
    }

    #[test]
    fn test_unknown_task_drag_aborts() {
        let (ctrl, store) = controller(&[("c1", &["t1"])], false);

        assert!(!ctrl.on_drag_start("ghost"));
        assert!(!ctrl.on_drag_over("t1"));
        ctrl.on_drag_end(Some("c1")).unwrap();

        assert_eq!(order(&store, "c1"), vec!["t1"]);
        assert!(ctrl.persistence.moves.lock().unwrap().is_empty());
    }

    #[test]
    fn test_release_outside_droppable_keeps_preview() {
        let (ctrl, store) = controller(&[("c1", &["t1", "t2", "t3"])], false);

        ctrl.on_drag_start("t3");
        ctrl.on_drag_over("t1");
        ctrl.on_drag_end(None).unwrap();

        assert_eq!(order(&store, "c1"), vec!["t3", "t1", "t2"]);
        assert!(ctrl.persistence.moves.lock().unwrap().is_empty());
    }

    #[test]
    fn test_persistence_failure_keeps_optimistic_state() {
        let (ctrl, store) = controller(&[("c1", &["t1"]), ("c2", &[])], true);

        ctrl.on_drag_start("t1");
        let err = ctrl.on_drag_end(Some("c2")).unwrap_err();
        assert!(matches!(err, PersistError::Backend(_)));

        // No rollback: local state keeps the move until a reload.
        assert!(order(&store, "c1").is_empty());
        assert_eq!(order(&store, "c2"), vec!["t1"]);

        // The provider's reload path restores server truth.
        store.replace(make_columns(&[("c1", &["t1"]), ("c2", &[])]));
        assert_eq!(order(&store, "c1"), vec!["t1"]);
    }

    #[test]
    fn test_active_task_exposed_during_session() {
        let (ctrl, _store) = controller(&[("c1", &["t1"])], false);

        assert!(ctrl.active_task().is_none());
        ctrl.on_drag_start("t1");
        assert_eq!(ctrl.active_task().unwrap().id, "t1");
        ctrl.on_drag_end(None).unwrap();
        assert!(ctrl.active_task().is_none());
    }
}
