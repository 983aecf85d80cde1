use chrono::NaiveDateTime;
use domain::{
    BanRecord, BanTarget, ChapterId, Comment, CommentKind, Profile, Reaction, ReactionKind, Role,
};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlComment {
    pub id: String,
    pub chapter_id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_role: String,
    pub body: String,
    pub parent_id: Option<String>,
    pub is_pinned: bool,
    pub is_spoiler: bool,
    pub is_deleted: bool,
    pub needs_review: bool,
    pub deleted_by: Option<String>,
    pub deleted_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        let kind = match sql.parent_id {
            Some(parent_id) => CommentKind::Reply { parent_id },
            None => CommentKind::TopLevel {
                is_pinned: sql.is_pinned,
            },
        };
        Comment {
            id: sql.id,
            chapter_id: ChapterId::new_unchecked(sql.chapter_id),
            author_id: sql.author_id,
            author_name: sql.author_name,
            author_role: Role::parse(&sql.author_role),
            body: sql.body,
            kind,
            is_spoiler: sql.is_spoiler,
            is_deleted: sql.is_deleted,
            needs_review: sql.needs_review,
            deleted_by: sql.deleted_by,
            deleted_reason: sql.deleted_reason,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlProfile {
    pub user_id: String,
    pub display_name: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl From<SqlProfile> for Profile {
    fn from(sql: SqlProfile) -> Self {
        Profile {
            user_id: sql.user_id,
            display_name: sql.display_name,
            role: Role::parse(&sql.role),
            created_at: sql.created_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlReaction {
    pub comment_id: String,
    pub user_id: String,
    pub kind: String,
    pub created_at: NaiveDateTime,
}

impl SqlReaction {
    /// Rows with an unrecognized kind are dropped rather than counted as
    /// some arbitrary kind.
    pub fn into_domain(self) -> Option<Reaction> {
        let kind = ReactionKind::parse(&self.kind)?;
        Some(Reaction {
            comment_id: self.comment_id,
            user_id: self.user_id,
            kind,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
pub struct SqlBan {
    pub id: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub reason: Option<String>,
    pub banned_until: Option<NaiveDateTime>,
    pub banned_by: String,
    pub created_at: NaiveDateTime,
}

impl From<SqlBan> for BanRecord {
    fn from(sql: SqlBan) -> Self {
        let target = match (sql.user_id, sql.session_id) {
            (Some(user_id), _) => BanTarget::User(user_id),
            (None, Some(session_id)) => BanTarget::Session(session_id),
            (None, None) => BanTarget::Session(String::new()),
        };
        BanRecord {
            id: sql.id,
            target,
            reason: sql.reason,
            banned_until: sql.banned_until,
            banned_by: sql.banned_by,
            created_at: sql.created_at,
        }
    }
}
