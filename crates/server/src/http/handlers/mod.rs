pub mod admin;
pub mod chapters;
pub mod comments;
pub mod moderation;
pub mod reactions;
pub mod sse;

use super::error::ApiError;
use crate::state::AppState;
use axum::http::{HeaderMap, StatusCode};
use domain::{has_permission, Actor, AppCommand, Capability, Role};
use engine::{CommandEnvelope, EngineReply};
use std::time::Duration;
use tokio::sync::oneshot;

const DISPATCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends a command to the engine worker and waits for its verdict.
pub(crate) async fn dispatch(state: &AppState, cmd: AppCommand) -> Result<EngineReply, ApiError> {
    let (tx, rx) = oneshot::channel();
    let envelope = CommandEnvelope { cmd, resp: tx };

    state
        .sender
        .send(envelope)
        .await
        .map_err(|_| ApiError::internal("Worker closed"))?;

    match tokio::time::timeout(DISPATCH_TIMEOUT, rx).await {
        Ok(Ok(result)) => result.map_err(Into::into),
        Ok(Err(_)) => Err(ApiError::internal("Worker dropped the response")),
        Err(_) => Err(ApiError(StatusCode::GATEWAY_TIMEOUT, "Timeout".into())),
    }
}

/// Resolves request identity: a verified bearer token yields a registered
/// user, anything else a salted session fingerprint of ip + user-agent.
pub(crate) async fn resolve_actor(state: &AppState, headers: &HeaderMap) -> Actor {
    let bearer = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .unwrap_or("0.0.0.0")
        .trim();
    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    engine::identity::resolve_actor(&state.auth, bearer, ip, user_agent, &state.identity_salt)
        .await
}

/// Read-side capability gate for moderation views. Mutations are gated in
/// the engine; listings never reach it, so the check lives here.
pub(crate) async fn require_capability(
    state: &AppState,
    headers: &HeaderMap,
    capability: Capability,
) -> Result<Actor, ApiError> {
    let actor = resolve_actor(state, headers).await;
    let role = match &actor {
        Actor::User(id) => state
            .db
            .get_profile(id)
            .await
            .map_err(ApiError::from)?
            .map(|p| p.role)
            .unwrap_or(Role::User),
        Actor::Session(_) => Role::User,
    };
    if !has_permission(role, capability) {
        return Err(ApiError::forbidden("Insufficient role"));
    }
    Ok(actor)
}
