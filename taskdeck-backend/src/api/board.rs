use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::Deserialize;
use taskdeck_core::persist::BoardSortKey;
use taskdeck_core::storage::{BoardPatch, BoardStorage, NewBoard};

use super::{bad_request, insert_header_safe, storage_error, ErrorResponse};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBoardsBody {
    new_order: Vec<BoardSortKey>,
}

pub async fn list_boards(State(state): State<AppState>) -> Json<serde_json::Value> {
    let boards = state.storage.list_boards();
    Json(serde_json::json!({ "boards": boards }))
}

/// POST /boards -- create a board with the default column set.
pub async fn create_board(
    State(state): State<AppState>,
    Json(body): Json<NewBoard>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<ErrorResponse>)> {
    if body.title.trim().is_empty() {
        return Err(bad_request(
            "taskdeck.api.create_board",
            "Missing or empty title",
        ));
    }

    let document = state
        .storage
        .create_board(body)
        .map_err(|e| storage_error("taskdeck.api.create_board", e))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "board": document })),
    ))
}

/// GET /boards/{board_id} -- full document with version ETag.
pub async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap, Json<serde_json::Value>), (StatusCode, Json<ErrorResponse>)> {
    let document = state.storage.read_board(&board_id).ok_or_else(|| {
        storage_error(
            "taskdeck.api.get_board",
            taskdeck_core::storage::StorageError::BoardNotFound(board_id.clone()),
        )
    })?;

    let version = state.storage.get_board_version(&board_id).unwrap_or(0);
    let etag = format!("\"{}\"", version);

    // Check If-None-Match for conditional response
    if let Some(if_none_match) = headers.get("if-none-match") {
        if let Ok(value) = if_none_match.to_str() {
            if value == etag {
                let mut resp_headers = HeaderMap::new();
                insert_header_safe(&mut resp_headers, "etag", &etag);
                return Ok((
                    StatusCode::NOT_MODIFIED,
                    resp_headers,
                    Json(serde_json::json!({})),
                ));
            }
        }
    }

    let mut resp_headers = HeaderMap::new();
    insert_header_safe(&mut resp_headers, "etag", &etag);

    Ok((
        StatusCode::OK,
        resp_headers,
        Json(serde_json::json!({
            "board": document.board,
            "columns": document.columns,
            "totalTasks": document.total_tasks(),
            "version": version,
        })),
    ))
}

/// PUT /boards/{board_id} -- patch metadata, tracking values and labels.
pub async fn update_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Json(patch): Json<BoardPatch>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let board = state
        .storage
        .update_board(&board_id, patch)
        .map_err(|e| storage_error("taskdeck.api.update_board", e))?;
    Ok(Json(serde_json::json!({ "board": board })))
}

/// DELETE /boards/{board_id}
pub async fn delete_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    state
        .storage
        .delete_board(&board_id)
        .map_err(|e| storage_error("taskdeck.api.delete_board", e))?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// PUT /boards/reorder -- rewrite dashboard sort keys.
pub async fn reorder_boards(
    State(state): State<AppState>,
    Json(body): Json<ReorderBoardsBody>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    state
        .storage
        .reorder_boards(&body.new_order)
        .map_err(|e| storage_error("taskdeck.api.reorder_boards", e))?;
    Ok(Json(serde_json::json!({ "success": true })))
}
