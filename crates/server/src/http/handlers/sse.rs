use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use domain::IngestEvent;
use futures::stream::Stream;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use crate::state::AppState;

/// Live comment feed for one chapter. Every mutation the engine commits is
/// broadcast; this stream forwards the ones matching the chapter in the path.
pub async fn sse_handler(
    State(state): State<AppState>,
    Path(chapter): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.tx_ingest.subscribe();
    tracing::info!("SSE connected: chapter={}", chapter);

    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) => match event {
            IngestEvent::CommentSaved {
                chapter_id,
                comment,
            } => {
                if chapter_id.as_str() == chapter {
                    let event_type = if comment.was_edited() {
                        "update_comment"
                    } else {
                        "new_comment"
                    };
                    Some(
                        Event::default()
                            .event(event_type)
                            .json_data(comment)
                            .map_err(|e| {
                                tracing::error!("SSE serialization error: {}", e);
                                axum::Error::new(e)
                            }),
                    )
                } else {
                    None
                }
            }
            IngestEvent::CommentDeleted {
                chapter_id,
                comment_id,
            } => {
                if chapter_id.as_str() == chapter {
                    Some(
                        Event::default()
                            .event("delete_comment")
                            .json_data(serde_json::json!({ "id": comment_id }))
                            .map_err(|e| {
                                tracing::error!("SSE serialization error: {}", e);
                                axum::Error::new(e)
                            }),
                    )
                } else {
                    None
                }
            }
            IngestEvent::CommentPinned {
                chapter_id,
                comment,
            } => {
                if chapter_id.as_str() == chapter {
                    Some(
                        Event::default()
                            .event("update_comment")
                            .json_data(comment)
                            .map_err(|e| {
                                tracing::error!("SSE serialization error: {}", e);
                                axum::Error::new(e)
                            }),
                    )
                } else {
                    None
                }
            }
            IngestEvent::ReactionChanged {
                chapter_id,
                comment_id,
                tally,
            } => {
                if chapter_id.as_str() == chapter {
                    Some(
                        Event::default()
                            .event("reaction_changed")
                            .json_data(serde_json::json!({ "id": comment_id, "tally": tally }))
                            .map_err(|e| {
                                tracing::error!("SSE serialization error: {}", e);
                                axum::Error::new(e)
                            }),
                    )
                } else {
                    None
                }
            }
        },
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(std::time::Duration::from_secs(15)))
}
