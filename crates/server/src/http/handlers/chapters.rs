use axum::{
    extract::{Path, State},
    Json,
};
use domain::ChapterId;

use crate::http::error::ApiError;
use crate::state::AppState;

/// View tracking. One atomic increment per request; no read-modify-write.
pub async fn record_view(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if ChapterId::new(&chapter_id).is_err() {
        return Err(ApiError::bad_request("Invalid chapter ID format"));
    }

    match state.db.increment_views(&chapter_id).await? {
        Some(views) => Ok(Json(serde_json::json!({ "success": true, "views": views }))),
        None => Err(ApiError(
            axum::http::StatusCode::NOT_FOUND,
            format!("Unknown chapter: {chapter_id}"),
        )),
    }
}
