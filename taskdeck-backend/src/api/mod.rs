use axum::{
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use taskdeck_core::storage::StorageError;

mod board;
mod events;
mod label;
mod task;

use crate::state::AppState;

/// Axum REST API routes.
///
///   GET  /boards                                  -> list board summaries (dashboard order)
///   POST /boards                                  -> create board with default columns
///   PUT  /boards/reorder                          -> rewrite dashboard sort keys
///   GET  /boards/{board_id}                       -> full board document (+ ETag)
///   PUT  /boards/{board_id}                       -> patch board metadata/values/labels
///   DELETE /boards/{board_id}                     -> delete board
///   POST /columns/{column_id}/tasks               -> create task at end of column
///   PUT  /columns/{column_id}/order               -> replace a column's task order
///   PUT  /tasks/{task_id}                         -> patch task attributes
///   DELETE /tasks/{task_id}                       -> delete task
///   POST /tasks/{task_id}/move                    -> relocate task to a column + index
///   GET  /labels                                  -> list labels
///   POST /labels                                  -> create label (palette color)
///   DELETE /labels/{label_id}                     -> delete label everywhere
///   GET  /events                                  -> SSE stream of board changes
///   GET  /status                                  -> health check
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/boards",
            get(board::list_boards).post(board::create_board),
        )
        .route("/boards/reorder", axum::routing::put(board::reorder_boards))
        .route(
            "/boards/{board_id}",
            get(board::get_board)
                .put(board::update_board)
                .delete(board::delete_board),
        )
        .route(
            "/columns/{column_id}/tasks",
            axum::routing::post(task::create_task),
        )
        .route(
            "/columns/{column_id}/order",
            axum::routing::put(task::reorder_column),
        )
        .route(
            "/tasks/{task_id}",
            axum::routing::put(task::update_task).delete(task::delete_task),
        )
        .route("/tasks/{task_id}/move", axum::routing::post(task::move_task))
        .route("/labels", get(label::list_labels).post(label::create_label))
        .route(
            "/labels/{label_id}",
            axum::routing::delete(label::delete_label),
        )
        .route("/events", get(events::sse_events))
        .route("/status", get(events::status))
}

// ── Shared types and helpers used across sub-modules ────────────────────

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

fn insert_header_safe(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match value.parse() {
        Ok(parsed) => {
            headers.insert(name, parsed);
        }
        Err(e) => {
            log::warn!("Failed to set header {}={} ({})", name, value, e);
        }
    }
}

fn log_api_issue(status: StatusCode, target: &'static str, message: impl AsRef<str>) {
    let message = message.as_ref();
    if status.is_server_error() {
        log::error!(target: target, "{}", message);
    } else {
        log::warn!(target: target, "{}", message);
    }
}

/// Map a storage error to an HTTP error response, logging it on the way.
fn storage_error(target: &'static str, e: StorageError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        StorageError::BoardNotFound(_)
        | StorageError::ColumnNotFound(_)
        | StorageError::TaskNotFound(_)
        | StorageError::LabelNotFound(_) => StatusCode::NOT_FOUND,
        StorageError::InvalidColor(_) | StorageError::InvalidDocument(_) => {
            StatusCode::BAD_REQUEST
        }
        StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    log_api_issue(status, target, e.to_string());
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn bad_request(target: &'static str, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    log_api_issue(StatusCode::BAD_REQUEST, target, message);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use taskdeck_core::storage::local::LocalStorage;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app() -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::open(dir.path()).unwrap());
        let state = AppState::new(storage, 0, "127.0.0.1".to_string());
        (api_router().with_state(state), dir)
    }

    #[tokio::test]
    async fn status_route_responds() {
        let (app, _dir) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _dir) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
