use crate::error::EngineError;
use crate::models::Comment;
use crate::moderation::{ModerationVerdict, Severity};
use crate::roles::{has_permission, Capability, Role};

/// What the moderation pipeline decided to store for a submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Body with mild terms already substituted.
    pub body: String,
    /// Routed to the manual review queue when true.
    pub needs_review: bool,
}

/// Applies the severity gate from the moderation verdict:
/// severe rejects outright, moderate stores but flags for review, mild
/// stores the substituted text, clean passes through.
pub fn gate_submission(verdict: &ModerationVerdict) -> Result<Submission, EngineError> {
    match verdict.severity {
        Severity::Severe => Err(EngineError::Validation(vec![format!(
            "المحتوى مرفوض: {}",
            verdict.detected_words.join("، ")
        )])),
        Severity::Moderate => Ok(Submission {
            body: verdict.filtered_content.clone(),
            needs_review: true,
        }),
        Severity::Mild | Severity::Clean => Ok(Submission {
            body: verdict.filtered_content.clone(),
            needs_review: false,
        }),
    }
}

/// Owner may edit their own comment; anyone with `can_edit_any_comment` may
/// edit any.
pub fn authorize_edit(actor_id: &str, role: Role, comment: &Comment) -> Result<(), EngineError> {
    if comment.author_id == actor_id || has_permission(role, Capability::CanEditAnyComment) {
        Ok(())
    } else {
        Err(EngineError::denied("edit requires ownership or can_edit_any_comment"))
    }
}

pub fn authorize_delete(actor_id: &str, role: Role, comment: &Comment) -> Result<(), EngineError> {
    if comment.author_id == actor_id
        || has_permission(role, Capability::CanDeleteAnyComment)
        || has_permission(role, Capability::CanModerateComments)
    {
        Ok(())
    } else {
        Err(EngineError::denied(
            "delete requires ownership or moderation capability",
        ))
    }
}

/// Deletion reasons are a moderation artifact: self-deletion needs no
/// justification, so a reason from a non-moderator is dropped.
pub fn sanitize_delete_reason(role: Role, reason: Option<String>) -> Option<String> {
    if has_permission(role, Capability::CanModerateComments) {
        reason
    } else {
        None
    }
}

/// Pinning is restricted to publishing staff and only applies to top-level
/// comments.
pub fn authorize_pin(role: Role, comment: &Comment) -> Result<(), EngineError> {
    if !has_permission(role, Capability::CanPinComments)
        && !has_permission(role, Capability::CanPublishDirectly)
    {
        return Err(EngineError::denied("pin requires can_pin_comments"));
    }
    if comment.is_reply() {
        return Err(EngineError::Validation(vec![
            "الردود لا يمكن تثبيتها".to_string(),
        ]));
    }
    Ok(())
}

/// A reply always hangs off a top-level comment. Replying to a reply
/// re-attaches to that reply's own parent, which keeps the tree at depth two
/// without pushing ancestor resolution onto clients.
pub fn resolve_parent(parent: &Comment) -> &str {
    match parent.parent_id() {
        Some(ancestor) => ancestor,
        None => &parent.id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChapterId, CommentKind};
    use crate::moderation::ContentModerator;
    use chrono::Utc;

    fn comment(author: &str, kind: CommentKind) -> Comment {
        let now = Utc::now().naive_utc();
        Comment {
            id: "c1".into(),
            chapter_id: ChapterId::new_unchecked("ch-1".into()),
            author_id: author.into(),
            author_name: author.into(),
            author_role: Role::User,
            body: "نص".into(),
            kind,
            is_spoiler: false,
            is_deleted: false,
            needs_review: false,
            deleted_by: None,
            deleted_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn severe_submission_is_rejected() {
        let verdict = ContentModerator::with_defaults().moderate("اقتل نفسك");
        assert!(matches!(
            gate_submission(&verdict),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn moderate_submission_is_stored_flagged() {
        let verdict = ContentModerator::with_defaults().moderate("يا حقير");
        let submission = gate_submission(&verdict).unwrap();
        assert!(submission.needs_review);
        assert_eq!(submission.body, "يا حقير");
    }

    #[test]
    fn mild_submission_is_stored_filtered() {
        let verdict = ContentModerator::with_defaults().moderate("أحمق");
        let submission = gate_submission(&verdict).unwrap();
        assert!(!submission.needs_review);
        assert_eq!(submission.body, "***");
    }

    #[test]
    fn owner_may_edit_without_capability() {
        let c = comment("u1", CommentKind::TopLevel { is_pinned: false });
        assert!(authorize_edit("u1", Role::User, &c).is_ok());
        assert!(authorize_edit("u2", Role::User, &c).is_err());
        assert!(authorize_edit("u2", Role::TribeLeader, &c).is_ok());
    }

    #[test]
    fn elite_fighter_may_delete_any_comment() {
        let c = comment("u1", CommentKind::TopLevel { is_pinned: false });
        assert!(authorize_delete("u2", Role::EliteFighter, &c).is_ok());
        assert!(authorize_delete("u2", Role::User, &c).is_err());
    }

    #[test]
    fn delete_reason_is_dropped_for_non_moderators() {
        assert_eq!(
            sanitize_delete_reason(Role::User, Some("spam".into())),
            None
        );
        assert_eq!(
            sanitize_delete_reason(Role::EliteFighter, Some("spam".into())),
            Some("spam".into())
        );
    }

    #[test]
    fn replies_cannot_be_pinned() {
        let reply = comment(
            "u1",
            CommentKind::Reply {
                parent_id: "c0".into(),
            },
        );
        assert!(authorize_pin(Role::Admin, &reply).is_err());

        let top = comment("u1", CommentKind::TopLevel { is_pinned: false });
        assert!(authorize_pin(Role::TribeLeader, &top).is_ok());
        assert!(authorize_pin(Role::EliteFighter, &top).is_err());
    }

    #[test]
    fn replying_to_a_reply_attaches_to_the_ancestor() {
        let top = comment("u1", CommentKind::TopLevel { is_pinned: false });
        assert_eq!(resolve_parent(&top), "c1");

        let reply = comment(
            "u2",
            CommentKind::Reply {
                parent_id: "c0".into(),
            },
        );
        assert_eq!(resolve_parent(&reply), "c0");
    }
}
