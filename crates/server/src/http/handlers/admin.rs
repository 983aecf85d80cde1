use axum::{extract::State, http::HeaderMap, Json};
use domain::{has_permission, AppCommand, Capability, Role};
use serde::Deserialize;

use super::{dispatch, resolve_actor};
use crate::http::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub user_id: String,
    pub role: String,
}

pub async fn assign_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AssignRoleRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Role::parse falls back to `user` on unknown input; for an explicit
    // assignment that silence would be a footgun, so reject instead.
    let role = Role::parse(&payload.role);
    if role.as_str() != payload.role {
        return Err(ApiError::bad_request(format!(
            "Unknown role: {}",
            payload.role
        )));
    }
    let actor = resolve_actor(&state, &headers).await;

    dispatch(
        &state,
        AppCommand::AssignRole {
            actor,
            target_user: payload.user_id,
            role,
        },
    )
    .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Role metadata for the UI: display name, color, icon, and the capability
/// set each rank holds.
pub async fn list_roles() -> Json<serde_json::Value> {
    let roles: Vec<serde_json::Value> = Role::ALL
        .iter()
        .map(|role| {
            let capabilities: Vec<&str> = Capability::ALL
                .iter()
                .filter(|cap| has_permission(*role, **cap))
                .map(|cap| cap.as_str())
                .collect();
            serde_json::json!({
                "role": role.as_str(),
                "displayName": role.display_name(),
                "colorTag": role.color_tag(),
                "icon": role.icon(),
                "capabilities": capabilities,
            })
        })
        .collect();
    Json(serde_json::json!({ "success": true, "roles": roles }))
}
