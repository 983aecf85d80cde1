use crate::models::Comment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Assembles a flat active listing into the user-visible order: pinned
/// top-level comments first, then top-level by creation time ascending;
/// replies under their parent by creation time ascending. Replies whose
/// parent is absent from the listing (tombstoned parent) are dropped.
pub fn build_threads(rows: Vec<Comment>) -> Vec<CommentThread> {
    let mut top_level = Vec::new();
    let mut replies = Vec::new();
    for row in rows {
        if row.is_reply() {
            replies.push(row);
        } else {
            top_level.push(row);
        }
    }

    top_level.sort_by(|a, b| {
        b.is_pinned()
            .cmp(&a.is_pinned())
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
    replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let mut threads: Vec<CommentThread> = top_level
        .into_iter()
        .map(|comment| CommentThread {
            comment,
            replies: Vec::new(),
        })
        .collect();

    for reply in replies {
        let parent = reply.parent_id().map(str::to_owned);
        if let Some(parent_id) = parent {
            if let Some(thread) = threads.iter_mut().find(|t| t.comment.id == parent_id) {
                thread.replies.push(reply);
            }
        }
    }

    threads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChapterId, CommentKind};
    use crate::roles::Role;
    use chrono::{Duration, Utc};

    fn comment(id: &str, kind: CommentKind, offset_secs: i64) -> Comment {
        let at = Utc::now().naive_utc() + Duration::seconds(offset_secs);
        Comment {
            id: id.into(),
            chapter_id: ChapterId::new_unchecked("ch-1".into()),
            author_id: "u1".into(),
            author_name: "u1".into(),
            author_role: Role::User,
            body: "نص".into(),
            kind,
            is_spoiler: false,
            is_deleted: false,
            needs_review: false,
            deleted_by: None,
            deleted_reason: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn pinned_comments_lead_then_creation_order() {
        let rows = vec![
            comment("a", CommentKind::TopLevel { is_pinned: false }, 0),
            comment("b", CommentKind::TopLevel { is_pinned: true }, 10),
            comment("c", CommentKind::TopLevel { is_pinned: false }, 5),
        ];
        let threads = build_threads(rows);
        let order: Vec<&str> = threads.iter().map(|t| t.comment.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn replies_attach_in_creation_order() {
        let rows = vec![
            comment("top", CommentKind::TopLevel { is_pinned: false }, 0),
            comment(
                "r2",
                CommentKind::Reply {
                    parent_id: "top".into(),
                },
                20,
            ),
            comment(
                "r1",
                CommentKind::Reply {
                    parent_id: "top".into(),
                },
                10,
            ),
        ];
        let threads = build_threads(rows);
        assert_eq!(threads.len(), 1);
        let replies: Vec<&str> = threads[0].replies.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(replies, vec!["r1", "r2"]);
    }

    #[test]
    fn orphaned_replies_are_dropped() {
        let rows = vec![comment(
            "r1",
            CommentKind::Reply {
                parent_id: "gone".into(),
            },
            0,
        )];
        assert!(build_threads(rows).is_empty());
    }
}
