use chrono::Utc;
use domain::{
    has_permission, lifecycle, moderation, reactions::ReactionTally, Actor, AppCommand, Capability,
    ChapterId, Comment, CommentKind, ContentModerator, EngineError, IngestEvent, ReactionKind,
    Role,
};
use storage::Db;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Number of recent comments per author fed into the near-duplicate check.
const SPAM_HISTORY_DEPTH: i64 = 5;

const GUEST_NAME: &str = "زائر";

#[derive(Debug)]
pub enum EngineReply {
    Comment(Comment),
    Tally(ReactionTally),
    Ack,
}

/// Applies commands against storage under the moderation and permission
/// rules. One instance serves the whole worker; it holds no mutable state of
/// its own.
pub struct Executor {
    db: Db,
    moderator: ContentModerator,
    tx_ingest: broadcast::Sender<IngestEvent>,
}

impl Executor {
    pub fn new(
        db: Db,
        moderator: ContentModerator,
        tx_ingest: broadcast::Sender<IngestEvent>,
    ) -> Self {
        Self {
            db,
            moderator,
            tx_ingest,
        }
    }

    pub async fn execute(&self, cmd: AppCommand) -> Result<EngineReply, EngineError> {
        match cmd {
            AppCommand::CreateComment {
                chapter_id,
                actor,
                body,
                parent_id,
                is_spoiler,
            } => self
                .create_comment(chapter_id, actor, body, parent_id, is_spoiler)
                .await
                .map(EngineReply::Comment),
            AppCommand::EditComment {
                comment_id,
                actor,
                body,
                is_spoiler,
            } => self
                .edit_comment(&comment_id, actor, body, is_spoiler)
                .await
                .map(EngineReply::Comment),
            AppCommand::DeleteComment {
                comment_id,
                actor,
                reason,
            } => self.delete_comment(&comment_id, actor, reason).await,
            AppCommand::SetPinned {
                comment_id,
                actor,
                pinned,
            } => self.set_pinned(&comment_id, actor, pinned).await,
            AppCommand::SetReaction {
                comment_id,
                actor,
                kind,
            } => self
                .set_reaction(&comment_id, actor, kind)
                .await
                .map(EngineReply::Tally),
            AppCommand::ResolveReview { comment_id, actor } => {
                self.resolve_review(&comment_id, actor).await
            }
            AppCommand::BanActor {
                actor,
                target,
                reason,
                banned_until,
            } => self.ban_actor(actor, target, reason, banned_until).await,
            AppCommand::LiftBan { actor, ban_id } => self.lift_ban(actor, &ban_id).await,
            AppCommand::AssignRole {
                actor,
                target_user,
                role,
            } => self.assign_role(actor, &target_user, role).await,
        }
    }

    async fn create_comment(
        &self,
        chapter_id: ChapterId,
        actor: Actor,
        body: String,
        parent_id: Option<String>,
        is_spoiler: bool,
    ) -> Result<Comment, EngineError> {
        self.ensure_not_banned(&actor).await?;
        let (role, author_name) = self.actor_identity(&actor).await?;

        if !self
            .db
            .chapter_exists(chapter_id.as_str())
            .await
            .map_err(upstream)?
        {
            return Err(EngineError::missing(format!("chapter {chapter_id}")));
        }

        let report = moderation::validate_comment_content(&body);
        if !report.is_valid {
            return Err(EngineError::Validation(report.errors));
        }

        let history = self
            .db
            .recent_bodies_by_author(actor.id(), SPAM_HISTORY_DEPTH)
            .await
            .map_err(upstream)?;
        if moderation::detect_spam(&body, &history) {
            return Err(EngineError::Validation(vec![
                "تم رفض التعليق: محتوى مكرر أو دعائي".to_string(),
            ]));
        }

        let verdict = self.moderator.moderate(&body);
        let submission = lifecycle::gate_submission(&verdict)?;

        let kind = match parent_id {
            None => CommentKind::TopLevel { is_pinned: false },
            Some(parent_id) => {
                let parent = self.fetch_live_comment(&parent_id).await?;
                if parent.chapter_id != chapter_id {
                    return Err(EngineError::Validation(vec![
                        "الرد يجب أن يكون في نفس الفصل".to_string(),
                    ]));
                }
                CommentKind::Reply {
                    parent_id: lifecycle::resolve_parent(&parent).to_string(),
                }
            }
        };

        let now = Utc::now().naive_utc();
        let comment = Comment {
            id: generate_id(),
            chapter_id: chapter_id.clone(),
            author_id: actor.id().to_string(),
            author_name,
            author_role: role,
            body: submission.body,
            kind,
            is_spoiler,
            is_deleted: false,
            needs_review: submission.needs_review,
            deleted_by: None,
            deleted_reason: None,
            created_at: now,
            updated_at: now,
        };

        self.db.insert_comment(&comment).await.map_err(upstream)?;
        let _ = self.tx_ingest.send(IngestEvent::CommentSaved {
            chapter_id,
            comment: comment.clone(),
        });
        Ok(comment)
    }

    async fn edit_comment(
        &self,
        comment_id: &str,
        actor: Actor,
        body: String,
        is_spoiler: Option<bool>,
    ) -> Result<Comment, EngineError> {
        let mut comment = self.fetch_live_comment(comment_id).await?;
        let (role, _) = self.actor_identity(&actor).await?;
        lifecycle::authorize_edit(actor.id(), role, &comment)?;

        let report = moderation::validate_comment_content(&body);
        if !report.is_valid {
            return Err(EngineError::Validation(report.errors));
        }
        let verdict = self.moderator.moderate(&body);
        let submission = lifecycle::gate_submission(&verdict)?;

        let now = Utc::now().naive_utc();
        self.db
            .update_comment_body(
                comment_id,
                &submission.body,
                submission.needs_review,
                is_spoiler,
                now,
            )
            .await
            .map_err(upstream)?;

        comment.body = submission.body;
        comment.needs_review = submission.needs_review;
        if let Some(spoiler) = is_spoiler {
            comment.is_spoiler = spoiler;
        }
        comment.updated_at = now;

        let _ = self.tx_ingest.send(IngestEvent::CommentSaved {
            chapter_id: comment.chapter_id.clone(),
            comment: comment.clone(),
        });
        Ok(comment)
    }

    async fn delete_comment(
        &self,
        comment_id: &str,
        actor: Actor,
        reason: Option<String>,
    ) -> Result<EngineReply, EngineError> {
        let comment = self.fetch_live_comment(comment_id).await?;
        let (role, _) = self.actor_identity(&actor).await?;
        lifecycle::authorize_delete(actor.id(), role, &comment)?;

        let reason = lifecycle::sanitize_delete_reason(role, reason);
        self.db
            .tombstone_comment(comment_id, actor.id(), reason.as_deref())
            .await
            .map_err(upstream)?;

        let _ = self.tx_ingest.send(IngestEvent::CommentDeleted {
            chapter_id: comment.chapter_id.clone(),
            comment_id: comment.id,
        });
        Ok(EngineReply::Ack)
    }

    async fn set_pinned(
        &self,
        comment_id: &str,
        actor: Actor,
        pinned: bool,
    ) -> Result<EngineReply, EngineError> {
        let mut comment = self.fetch_live_comment(comment_id).await?;
        let (role, _) = self.actor_identity(&actor).await?;
        lifecycle::authorize_pin(role, &comment)?;

        self.db
            .set_comment_pinned(comment_id, pinned)
            .await
            .map_err(upstream)?;

        comment.kind = CommentKind::TopLevel { is_pinned: pinned };
        let _ = self.tx_ingest.send(IngestEvent::CommentPinned {
            chapter_id: comment.chapter_id.clone(),
            comment,
        });
        Ok(EngineReply::Ack)
    }

    async fn set_reaction(
        &self,
        comment_id: &str,
        actor: Actor,
        kind: Option<ReactionKind>,
    ) -> Result<ReactionTally, EngineError> {
        if !actor.is_registered() {
            return Err(EngineError::denied("reactions require an account"));
        }
        let comment = self.fetch_live_comment(comment_id).await?;

        match kind {
            Some(kind) => self
                .db
                .set_reaction(comment_id, actor.id(), kind)
                .await
                .map_err(upstream)?,
            None => self
                .db
                .clear_reaction(comment_id, actor.id())
                .await
                .map_err(upstream)?,
        }

        let tally = self.db.reaction_tally(comment_id).await.map_err(upstream)?;
        let _ = self.tx_ingest.send(IngestEvent::ReactionChanged {
            chapter_id: comment.chapter_id,
            comment_id: comment_id.to_string(),
            tally: tally.clone(),
        });
        Ok(tally)
    }

    async fn resolve_review(
        &self,
        comment_id: &str,
        actor: Actor,
    ) -> Result<EngineReply, EngineError> {
        let (role, _) = self.actor_identity(&actor).await?;
        if !has_permission(role, Capability::CanResolveReports) {
            return Err(EngineError::denied("resolving reports requires can_resolve_reports"));
        }
        if !self
            .db
            .resolve_review(comment_id)
            .await
            .map_err(upstream)?
        {
            return Err(EngineError::missing(format!("comment {comment_id}")));
        }
        info!(moderator = actor.id(), comment = comment_id, "review flag cleared");
        Ok(EngineReply::Ack)
    }

    async fn ban_actor(
        &self,
        actor: Actor,
        target: domain::BanTarget,
        reason: Option<String>,
        banned_until: Option<chrono::NaiveDateTime>,
    ) -> Result<EngineReply, EngineError> {
        let (role, _) = self.actor_identity(&actor).await?;
        if !has_permission(role, Capability::CanBanUsers) {
            return Err(EngineError::denied("banning requires can_ban_users"));
        }
        self.db
            .insert_ban(
                &generate_id(),
                &target,
                reason.as_deref(),
                banned_until,
                actor.id(),
            )
            .await
            .map_err(upstream)?;
        Ok(EngineReply::Ack)
    }

    async fn lift_ban(&self, actor: Actor, ban_id: &str) -> Result<EngineReply, EngineError> {
        let (role, _) = self.actor_identity(&actor).await?;
        if !has_permission(role, Capability::CanBanUsers) {
            return Err(EngineError::denied("lifting bans requires can_ban_users"));
        }
        if !self.db.lift_ban(ban_id).await.map_err(upstream)? {
            return Err(EngineError::missing(format!("ban {ban_id}")));
        }
        Ok(EngineReply::Ack)
    }

    async fn assign_role(
        &self,
        actor: Actor,
        target_user: &str,
        role: Role,
    ) -> Result<EngineReply, EngineError> {
        let (actor_role, _) = self.actor_identity(&actor).await?;
        if !has_permission(actor_role, Capability::CanAssignRoles) {
            return Err(EngineError::denied("role assignment requires can_assign_roles"));
        }
        if !self
            .db
            .set_role(target_user, role)
            .await
            .map_err(upstream)?
        {
            return Err(EngineError::missing(format!("user {target_user}")));
        }
        info!(by = actor.id(), user = target_user, role = role.as_str(), "role assigned");
        Ok(EngineReply::Ack)
    }

    /// Resolves the actor to a role and display name. Session actors hold
    /// the lowest role; a bearer token that maps to no profile is an error
    /// rather than a silent guest downgrade.
    async fn actor_identity(&self, actor: &Actor) -> Result<(Role, String), EngineError> {
        match actor {
            Actor::User(id) => match self.db.get_profile(id).await.map_err(upstream)? {
                Some(profile) => Ok((profile.role, profile.display_name)),
                None => Err(EngineError::missing(format!("user {id}"))),
            },
            Actor::Session(_) => Ok((Role::User, GUEST_NAME.to_string())),
        }
    }

    async fn ensure_not_banned(&self, actor: &Actor) -> Result<(), EngineError> {
        let (user_id, session_id) = match actor {
            Actor::User(id) => (Some(id.as_str()), None),
            Actor::Session(id) => (None, Some(id.as_str())),
        };
        let ban = self
            .db
            .find_active_ban(user_id, session_id)
            .await
            .map_err(upstream)?;
        if ban.is_some() {
            return Err(EngineError::Banned);
        }
        Ok(())
    }

    /// Tombstoned comments are invisible to mutations: they are `NotFound`
    /// like a row that never existed.
    async fn fetch_live_comment(&self, comment_id: &str) -> Result<Comment, EngineError> {
        match self.db.get_comment(comment_id).await.map_err(upstream)? {
            Some(c) if !c.is_deleted => Ok(c),
            _ => Err(EngineError::missing(format!("comment {comment_id}"))),
        }
    }
}

fn generate_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

fn upstream(e: anyhow::Error) -> EngineError {
    error!("storage failure: {e:?}");
    EngineError::Upstream(e.to_string())
}
