use crate::models::{Actor, BanTarget, ChapterId};
use crate::reactions::ReactionKind;
use crate::roles::Role;
use chrono::NaiveDateTime;

/// Mutations accepted by the engine worker. Each command is one logical
/// persistence operation; there is no multi-step mutation to roll back.
#[derive(Debug)]
pub enum AppCommand {
    CreateComment {
        chapter_id: ChapterId,
        actor: Actor,
        body: String,
        parent_id: Option<String>,
        is_spoiler: bool,
    },
    EditComment {
        comment_id: String,
        actor: Actor,
        body: String,
        is_spoiler: Option<bool>,
    },
    DeleteComment {
        comment_id: String,
        actor: Actor,
        reason: Option<String>,
    },
    SetPinned {
        comment_id: String,
        actor: Actor,
        pinned: bool,
    },
    /// `kind = None` clears the actor's reaction.
    SetReaction {
        comment_id: String,
        actor: Actor,
        kind: Option<ReactionKind>,
    },
    ResolveReview {
        comment_id: String,
        actor: Actor,
    },
    BanActor {
        actor: Actor,
        target: BanTarget,
        reason: Option<String>,
        banned_until: Option<NaiveDateTime>,
    },
    LiftBan {
        actor: Actor,
        ban_id: String,
    },
    AssignRole {
        actor: Actor,
        target_user: String,
        role: Role,
    },
}
