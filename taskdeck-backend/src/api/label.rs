use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use taskdeck_core::storage::BoardStorage;

use super::{bad_request, storage_error, ErrorResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateLabelBody {
    text: String,
    color: String,
}

pub async fn list_labels(State(state): State<AppState>) -> Json<serde_json::Value> {
    let labels = state.storage.list_labels();
    Json(serde_json::json!({ "labels": labels }))
}

/// POST /labels -- create a label; the color must come from the palette.
pub async fn create_label(
    State(state): State<AppState>,
    Json(body): Json<CreateLabelBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<ErrorResponse>)> {
    if body.text.trim().is_empty() {
        return Err(bad_request(
            "taskdeck.api.create_label",
            "Missing or empty label text",
        ));
    }

    let label = state
        .storage
        .create_label(body.text.trim(), &body.color)
        .map_err(|e| storage_error("taskdeck.api.create_label", e))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "label": label })),
    ))
}

/// DELETE /labels/{label_id} -- remove from the global list and all boards.
pub async fn delete_label(
    State(state): State<AppState>,
    Path(label_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    state
        .storage
        .delete_label(&label_id)
        .map_err(|e| storage_error("taskdeck.api.delete_label", e))?;
    Ok(Json(serde_json::json!({ "success": true })))
}
