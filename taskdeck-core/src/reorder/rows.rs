/// Dashboard board-row reordering.
///
/// Same algorithmic shape as the task engine — splice-move on an ordered
/// sequence — but rows persist floating sort keys and commit persist-first:
/// the full new order is written to the persistence service before local
/// state is resorted, and a failed write leaves local order untouched so the
/// caller can reload.
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::persist::{BoardSortKey, PersistError, Persistence};
use crate::types::Board;

use super::engine::array_move;

/// Plan a row move: splice the dragged board to the target row's position and
/// emit the complete new order as dense sort keys. Unknown ids or a drop on
/// the row's own position yield no plan.
pub fn plan_row_reorder(
    boards: &[Board],
    active_id: &str,
    over_id: &str,
) -> Option<Vec<BoardSortKey>> {
    let from = boards.iter().position(|b| b.id == active_id)?;
    let to = boards.iter().position(|b| b.id == over_id)?;
    if from == to {
        return None;
    }

    let mut ids: Vec<String> = boards.iter().map(|b| b.id.clone()).collect();
    array_move(&mut ids, from, to);

    Some(
        ids.into_iter()
            .enumerate()
            .map(|(i, id)| BoardSortKey {
                id,
                sort_order: i as f64,
            })
            .collect(),
    )
}

/// Apply planned sort keys: write each key onto its board, then stable-sort
/// ascending. Boards absent from the plan keep their existing key.
pub fn apply_sort_keys(boards: &mut [Board], keys: &[BoardSortKey]) {
    let order_map: HashMap<&str, f64> = keys.iter().map(|k| (k.id.as_str(), k.sort_order)).collect();
    for board in boards.iter_mut() {
        if let Some(key) = order_map.get(board.id.as_str()) {
            board.sort_order = *key;
        }
    }
    boards.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));
}

/// Owner of the dashboard's board rows.
pub struct DashboardController<P: Persistence> {
    boards: RwLock<Vec<Board>>,
    persistence: Arc<P>,
}

impl<P: Persistence> DashboardController<P> {
    pub fn new(boards: Vec<Board>, persistence: Arc<P>) -> Self {
        Self {
            boards: RwLock::new(boards),
            persistence,
        }
    }

    pub fn boards(&self) -> Vec<Board> {
        self.boards.read().unwrap().clone()
    }

    /// Swap the row collection (load / reload-on-error path).
    pub fn replace(&self, boards: Vec<Board>) {
        *self.boards.write().unwrap() = boards;
    }

    /// Handle a row drop: plan, persist, and only then resort local state.
    pub fn reorder(&self, active_id: &str, over_id: &str) -> Result<(), PersistError> {
        let plan = {
            let boards = self.boards.read().unwrap();
            plan_row_reorder(&boards, active_id, over_id)
        };
        let Some(keys) = plan else {
            return Ok(());
        };

        if let Err(e) = self.persistence.reorder_boards(&keys) {
            log::error!("[taskdeck.reorder.rows] Board reorder failed: {}", e);
            return Err(e);
        }

        apply_sort_keys(&mut self.boards.write().unwrap(), &keys);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Board;
    use chrono::Utc;
    use std::sync::Mutex;

    fn make_board(id: &str, sort_order: f64) -> Board {
        Board {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: None,
            color: "bg-blue-500".to_string(),
            sort_order,
            labels: Vec::new(),
            total_value: 0.0,
            upcoming_value: 0.0,
            received_value: 0.0,
            retainer_y: 0.0,
            started_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn board_ids(boards: &[Board]) -> Vec<String> {
        boards.iter().map(|b| b.id.clone()).collect()
    }

    #[derive(Default)]
    struct RecordingPersistence {
        reorders: Mutex<Vec<Vec<BoardSortKey>>>,
        fail: bool,
    }

    impl Persistence for RecordingPersistence {
        fn move_task(&self, _: &str, _: &str, _: usize) -> Result<(), PersistError> {
            Ok(())
        }

        fn reorder_column(&self, _: &str, _: &[String]) -> Result<(), PersistError> {
            Ok(())
        }

        fn reorder_boards(&self, new_order: &[BoardSortKey]) -> Result<(), PersistError> {
            self.reorders.lock().unwrap().push(new_order.to_vec());
            if self.fail {
                return Err(PersistError::Backend("write rejected".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_plan_moves_row_and_reassigns_dense_keys() {
        let boards = vec![
            make_board("b1", 0.0),
            make_board("b2", 1.0),
            make_board("b3", 2.0),
        ];
        let keys = plan_row_reorder(&boards, "b1", "b3").unwrap();
        assert_eq!(
            keys,
            vec![
                BoardSortKey {
                    id: "b2".to_string(),
                    sort_order: 0.0
                },
                BoardSortKey {
                    id: "b3".to_string(),
                    sort_order: 1.0
                },
                BoardSortKey {
                    id: "b1".to_string(),
                    sort_order: 2.0
                },
            ]
        );
    }

    #[test]
    fn test_plan_unknown_or_self_is_none() {
        let boards = vec![make_board("b1", 0.0), make_board("b2", 1.0)];
        assert!(plan_row_reorder(&boards, "ghost", "b2").is_none());
        assert!(plan_row_reorder(&boards, "b1", "ghost").is_none());
        assert!(plan_row_reorder(&boards, "b1", "b1").is_none());
    }

    #[test]
    fn test_apply_sort_keys_with_fallback() {
        let mut boards = vec![
            make_board("b1", 0.0),
            make_board("b2", 1.0),
            make_board("b3", 5.0),
        ];
        // Plan covers b1/b2 only; b3 keeps its own key.
        let keys = vec![
            BoardSortKey {
                id: "b2".to_string(),
                sort_order: 0.0,
            },
            BoardSortKey {
                id: "b1".to_string(),
                sort_order: 1.0,
            },
        ];
        apply_sort_keys(&mut boards, &keys);
        assert_eq!(board_ids(&boards), vec!["b2", "b1", "b3"]);
        assert_eq!(boards[2].sort_order, 5.0);
    }

    #[test]
    fn test_controller_persists_before_sorting() {
        let persistence = Arc::new(RecordingPersistence::default());
        let ctrl = DashboardController::new(
            vec![make_board("b1", 0.0), make_board("b2", 1.0)],
            persistence.clone(),
        );

        ctrl.reorder("b1", "b2").unwrap();
        assert_eq!(board_ids(&ctrl.boards()), vec!["b2", "b1"]);
        assert_eq!(persistence.reorders.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_controller_failed_persist_leaves_order() {
        let persistence = Arc::new(RecordingPersistence {
            fail: true,
            ..Default::default()
        });
        let ctrl = DashboardController::new(
            vec![make_board("b1", 0.0), make_board("b2", 1.0)],
            persistence,
        );

        assert!(ctrl.reorder("b1", "b2").is_err());
        assert_eq!(board_ids(&ctrl.boards()), vec!["b1", "b2"]);
    }

    #[test]
    fn test_controller_noop_drop_skips_persistence() {
        let persistence = Arc::new(RecordingPersistence::default());
        let ctrl =
            DashboardController::new(vec![make_board("b1", 0.0)], persistence.clone());

        ctrl.reorder("b1", "b1").unwrap();
        assert!(persistence.reorders.lock().unwrap().is_empty());
    }
}
