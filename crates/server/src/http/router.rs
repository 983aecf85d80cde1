use super::handlers::{admin, chapters, comments, moderation, reactions, sse};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::PUT,
                Method::DELETE,
            ])
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route(
            "/api/chapters/:chapter_id/comments",
            get(comments::list_comments),
        )
        .route(
            "/api/chapters/:chapter_id/comments/sse",
            get(sse::sse_handler),
        )
        .route("/api/chapters/:chapter_id/view", post(chapters::record_view))
        .route("/api/comments", post(comments::create_comment))
        .route(
            "/api/comments/:comment_id",
            patch(comments::edit_comment).delete(comments::delete_comment),
        )
        .route("/api/comments/:comment_id/pin", post(comments::set_pinned))
        .route(
            "/api/comments/:comment_id/reaction",
            put(reactions::set_reaction).delete(reactions::clear_reaction),
        )
        .route(
            "/api/comments/:comment_id/reactions",
            get(reactions::get_tally),
        )
        .route("/api/moderation/queue", get(moderation::review_queue))
        .route(
            "/api/moderation/queue/:comment_id/resolve",
            post(moderation::resolve_review),
        )
        .route(
            "/api/moderation/chapters/:chapter_id/comments",
            get(moderation::audit_comments),
        )
        .route("/api/moderation/bans", post(moderation::create_ban))
        .route("/api/moderation/bans/:ban_id", delete(moderation::lift_ban))
        .route("/api/admin/roles", post(admin::assign_role))
        .route("/api/roles", get(admin::list_roles))
        .layer(cors)
        .with_state(state)
}
