use crate::models::{ChapterId, Comment};
use crate::reactions::ReactionTally;
use serde::{Deserialize, Serialize};

/// Broadcast to live listeners (SSE streams) after a mutation lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IngestEvent {
    CommentSaved {
        chapter_id: ChapterId,
        comment: Comment,
    },
    CommentDeleted {
        chapter_id: ChapterId,
        comment_id: String,
    },
    /// Pin state flipped; the body and timestamps are untouched, so this is
    /// not a save.
    CommentPinned {
        chapter_id: ChapterId,
        comment: Comment,
    },
    ReactionChanged {
        chapter_id: ChapterId,
        comment_id: String,
        tally: ReactionTally,
    },
}
