use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use domain::{thread, AppCommand, ChapterId};
use serde::Deserialize;

use super::{dispatch, resolve_actor};
use crate::http::error::ApiError;
use crate::state::AppState;
use engine::EngineReply;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub chapter_id: String,
    pub content: String,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_spoiler: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCommentRequest {
    pub content: String,
    pub is_spoiler: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRequest {
    pub pinned: bool,
}

/// Active projection, threaded: pinned first, then oldest-first, replies
/// under their parents.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if ChapterId::new(&chapter_id).is_err() {
        return Err(ApiError::bad_request("Invalid chapter ID format"));
    }

    let rows = state.db.list_active_comments(&chapter_id).await?;
    let threads = thread::build_threads(rows);
    Ok(Json(serde_json::json!({ "success": true, "comments": threads })))
}

pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let chapter_id = ChapterId::new(payload.chapter_id).map_err(ApiError::bad_request)?;
    let actor = resolve_actor(&state, &headers).await;

    let reply = dispatch(
        &state,
        AppCommand::CreateComment {
            chapter_id,
            actor,
            body: payload.content,
            parent_id: payload.parent_id,
            is_spoiler: payload.is_spoiler,
        },
    )
    .await?;

    match reply {
        EngineReply::Comment(comment) => {
            Ok(Json(serde_json::json!({ "success": true, "comment": comment })))
        }
        _ => Err(ApiError::internal("Unexpected engine reply")),
    }
}

pub async fn edit_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<String>,
    Json(payload): Json<EditCommentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = resolve_actor(&state, &headers).await;

    let reply = dispatch(
        &state,
        AppCommand::EditComment {
            comment_id,
            actor,
            body: payload.content,
            is_spoiler: payload.is_spoiler,
        },
    )
    .await?;

    match reply {
        EngineReply::Comment(comment) => {
            Ok(Json(serde_json::json!({ "success": true, "comment": comment })))
        }
        _ => Err(ApiError::internal("Unexpected engine reply")),
    }
}

pub async fn delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<String>,
    payload: Option<Json<DeleteCommentRequest>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = resolve_actor(&state, &headers).await;
    let reason = payload.and_then(|Json(p)| p.reason);

    dispatch(
        &state,
        AppCommand::DeleteComment {
            comment_id,
            actor,
            reason,
        },
    )
    .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn set_pinned(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<String>,
    Json(payload): Json<PinRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = resolve_actor(&state, &headers).await;

    dispatch(
        &state,
        AppCommand::SetPinned {
            comment_id,
            actor,
            pinned: payload.pinned,
        },
    )
    .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
