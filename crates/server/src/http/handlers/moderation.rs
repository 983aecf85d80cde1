use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDateTime;
use domain::{AppCommand, BanTarget, Capability, ChapterId};
use serde::Deserialize;

use super::{dispatch, require_capability, resolve_actor};
use crate::http::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRequest {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub reason: Option<String>,
    pub banned_until: Option<NaiveDateTime>,
}

/// Comments awaiting a human decision, oldest first.
pub async fn review_queue(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_capability(&state, &headers, Capability::CanViewReports).await?;

    let queue = state.db.review_queue().await?;
    Ok(Json(serde_json::json!({ "success": true, "queue": queue })))
}

pub async fn resolve_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = resolve_actor(&state, &headers).await;

    dispatch(&state, AppCommand::ResolveReview { comment_id, actor }).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Audit projection: tombstones included, with their `deleted_by` and
/// `deleted_reason` trail.
pub async fn audit_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chapter_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_capability(&state, &headers, Capability::CanViewReports).await?;

    if ChapterId::new(&chapter_id).is_err() {
        return Err(ApiError::bad_request("Invalid chapter ID format"));
    }
    let comments = state.db.list_all_comments(&chapter_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "comments": comments })))
}

pub async fn create_ban(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BanRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = match (payload.user_id, payload.session_id) {
        (Some(user_id), None) => BanTarget::User(user_id),
        (None, Some(session_id)) => BanTarget::Session(session_id),
        _ => {
            return Err(ApiError::bad_request(
                "Exactly one of userId or sessionId is required",
            ))
        }
    };
    let actor = resolve_actor(&state, &headers).await;

    dispatch(
        &state,
        AppCommand::BanActor {
            actor,
            target,
            reason: payload.reason,
            banned_until: payload.banned_until,
        },
    )
    .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn lift_ban(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ban_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = resolve_actor(&state, &headers).await;

    dispatch(&state, AppCommand::LiftBan { actor, ban_id }).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
