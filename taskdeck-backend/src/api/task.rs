use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use taskdeck_core::storage::{BoardStorage, NewTask, TaskPatch};

use super::{bad_request, storage_error, ErrorResponse};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskBody {
    target_column_id: String,
    new_index: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderColumnBody {
    ordered_task_ids: Vec<String>,
}

/// POST /columns/{column_id}/tasks -- create a task at the end of a column.
pub async fn create_task(
    State(state): State<AppState>,
    Path(column_id): Path<String>,
    Json(body): Json<NewTask>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<ErrorResponse>)> {
    if body.title.trim().is_empty() {
        return Err(bad_request(
            "taskdeck.api.create_task",
            "Missing or empty title",
        ));
    }

    let task = state
        .storage
        .create_task(&column_id, body)
        .map_err(|e| storage_error("taskdeck.api.create_task", e))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "task": task })),
    ))
}

/// PUT /tasks/{task_id} -- patch task attributes.
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let task = state
        .storage
        .update_task(&task_id, patch)
        .map_err(|e| storage_error("taskdeck.api.update_task", e))?;
    Ok(Json(serde_json::json!({ "task": task })))
}

/// DELETE /tasks/{task_id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    state
        .storage
        .delete_task(&task_id)
        .map_err(|e| storage_error("taskdeck.api.delete_task", e))?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /tasks/{task_id}/move -- relocate a task to a column at an index.
/// Safe to call when the task already sits in the target column.
pub async fn move_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<MoveTaskBody>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    state
        .storage
        .move_task(&task_id, &body.target_column_id, body.new_index)
        .map_err(|e| storage_error("taskdeck.api.move_task", e))?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// PUT /columns/{column_id}/order -- replace a column's task order.
pub async fn reorder_column(
    State(state): State<AppState>,
    Path(column_id): Path<String>,
    Json(body): Json<ReorderColumnBody>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    state
        .storage
        .reorder_column(&column_id, &body.ordered_task_ids)
        .map_err(|e| storage_error("taskdeck.api.reorder_column", e))?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taskdeck_core::storage::local::LocalStorage;
    use taskdeck_core::storage::NewBoard;
    use taskdeck_core::types::Priority;
    use tempfile::TempDir;

    /// Board with default columns; returns (state, board_id, column_ids).
    async fn setup() -> (AppState, Vec<String>, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::open(dir.path()).unwrap());
        let doc = storage
            .create_board(NewBoard {
                title: "Board".to_string(),
                ..Default::default()
            })
            .unwrap();
        let columns = doc.columns.iter().map(|c| c.id.clone()).collect();
        (
            AppState::new(storage, 0, "127.0.0.1".to_string()),
            columns,
            dir,
        )
    }

    async fn add_task(state: &AppState, column_id: &str, title: &str) -> String {
        let (_, Json(created)) = create_task(
            State(state.clone()),
            Path(column_id.to_string()),
            Json(NewTask {
                title: title.to_string(),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        created["task"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn create_task_appends_to_column() {
        let (state, columns, _dir) = setup().await;
        let t1 = add_task(&state, &columns[0], "First").await;
        let t2 = add_task(&state, &columns[0], "Second").await;

        let doc = state.storage.list_boards();
        assert_eq!(doc[0].total_tasks, 2);
        let board = state
            .storage
            .read_board(&doc[0].id)
            .unwrap();
        let order: Vec<&str> = board.columns[0].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec![t1.as_str(), t2.as_str()]);
    }

    #[tokio::test]
    async fn create_task_rejects_empty_title() {
        let (state, columns, _dir) = setup().await;
        let err = create_task(
            State(state),
            Path(columns[0].clone()),
            Json(NewTask::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn move_task_appends_cross_column() {
        let (state, columns, _dir) = setup().await;
        let t1 = add_task(&state, &columns[0], "T1").await;
        add_task(&state, &columns[1], "T5").await;
        add_task(&state, &columns[1], "T6").await;

        move_task(
            State(state.clone()),
            Path(t1.clone()),
            Json(MoveTaskBody {
                target_column_id: columns[1].clone(),
                new_index: 2,
            }),
        )
        .await
        .unwrap();

        let board_id = state.storage.list_boards()[0].id.clone();
        let doc = state.storage.read_board(&board_id).unwrap();
        assert!(doc.columns[0].tasks.is_empty());
        assert_eq!(doc.columns[1].tasks.len(), 3);
        assert_eq!(doc.columns[1].tasks[2].id, t1);
    }

    #[tokio::test]
    async fn move_unknown_task_is_404() {
        let (state, columns, _dir) = setup().await;
        let err = move_task(
            State(state),
            Path("ghost".to_string()),
            Json(MoveTaskBody {
                target_column_id: columns[0].clone(),
                new_index: 0,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reorder_column_applies_permutation() {
        let (state, columns, _dir) = setup().await;
        let t1 = add_task(&state, &columns[0], "A").await;
        let t2 = add_task(&state, &columns[0], "B").await;

        reorder_column(
            State(state.clone()),
            Path(columns[0].clone()),
            Json(ReorderColumnBody {
                ordered_task_ids: vec![t2.clone(), t1.clone()],
            }),
        )
        .await
        .unwrap();

        // A non-permutation is rejected.
        let err = reorder_column(
            State(state.clone()),
            Path(columns[0].clone()),
            Json(ReorderColumnBody {
                ordered_task_ids: vec![t1.clone()],
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let board_id = state.storage.list_boards()[0].id.clone();
        let doc = state.storage.read_board(&board_id).unwrap();
        let order: Vec<&str> = doc.columns[0].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec![t2.as_str(), t1.as_str()]);
    }

    #[tokio::test]
    async fn update_task_patches_attributes() {
        let (state, columns, _dir) = setup().await;
        let t1 = add_task(&state, &columns[0], "T1").await;

        let Json(updated) = update_task(
            State(state),
            Path(t1),
            Json(TaskPatch {
                priority: Some(Priority::High),
                assignee: Some("ada".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated["task"]["priority"], "high");
        assert_eq!(updated["task"]["assignee"], "ada");
    }
}
