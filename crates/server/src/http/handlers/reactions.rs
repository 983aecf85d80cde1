use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use domain::{AppCommand, ReactionKind};
use serde::Deserialize;

use super::{dispatch, resolve_actor};
use crate::http::error::ApiError;
use crate::state::AppState;
use engine::EngineReply;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRequest {
    pub kind: String,
}

pub async fn set_reaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<String>,
    Json(payload): Json<ReactionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let kind = ReactionKind::parse(&payload.kind)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown reaction kind: {}", payload.kind)))?;
    let actor = resolve_actor(&state, &headers).await;

    let reply = dispatch(
        &state,
        AppCommand::SetReaction {
            comment_id,
            actor,
            kind: Some(kind),
        },
    )
    .await?;

    tally_response(reply)
}

pub async fn clear_reaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = resolve_actor(&state, &headers).await;

    let reply = dispatch(
        &state,
        AppCommand::SetReaction {
            comment_id,
            actor,
            kind: None,
        },
    )
    .await?;

    tally_response(reply)
}

/// Counts plus the caller's own reaction, recomputed from current rows.
pub async fn get_tally(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tally = state.db.reaction_tally(&comment_id).await?;

    let actor = resolve_actor(&state, &headers).await;
    let own = if actor.is_registered() {
        state.db.user_reaction(&comment_id, actor.id()).await?
    } else {
        None
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "tally": tally,
        "userReaction": own,
    })))
}

fn tally_response(reply: EngineReply) -> Result<Json<serde_json::Value>, ApiError> {
    match reply {
        EngineReply::Tally(tally) => {
            Ok(Json(serde_json::json!({ "success": true, "tally": tally })))
        }
        _ => Err(ApiError::internal("Unexpected engine reply")),
    }
}
