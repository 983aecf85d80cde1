use crate::roles::Role;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(String);

impl ChapterId {
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err("Chapter ID contains invalid characters.".to_string());
        }
        if s.is_empty() || s.len() > 64 {
            return Err("Chapter ID must be 1-64 characters.".to_string());
        }
        Ok(Self(s))
    }

    pub fn new_unchecked(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position in the two-level comment tree. A reply carries the id of its
/// top-level parent; there is no deeper nesting, so the depth-2 bound holds
/// by construction rather than by convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommentKind {
    TopLevel { is_pinned: bool },
    Reply { parent_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub chapter_id: ChapterId,
    pub author_id: String,
    pub author_name: String,
    pub author_role: Role,
    pub body: String,
    #[serde(flatten)]
    pub kind: CommentKind,
    pub is_spoiler: bool,
    pub is_deleted: bool,
    pub needs_review: bool,
    pub deleted_by: Option<String>,
    pub deleted_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        matches!(self.kind, CommentKind::Reply { .. })
    }

    pub fn parent_id(&self) -> Option<&str> {
        match &self.kind {
            CommentKind::TopLevel { .. } => None,
            CommentKind::Reply { parent_id } => Some(parent_id),
        }
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self.kind, CommentKind::TopLevel { is_pinned: true })
    }

    /// `created_at == updated_at` signals the comment was never edited.
    pub fn was_edited(&self) -> bool {
        self.created_at != self.updated_at
    }
}

/// The identity a request resolved to: a registered account or an anonymous
/// session fingerprint. Sessions can comment but never hold a role above the
/// lowest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Actor {
    User(String),
    Session(String),
}

impl Actor {
    pub fn id(&self) -> &str {
        match self {
            Actor::User(id) | Actor::Session(id) => id,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Actor::User(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

/// `banned_until = None` is a permanent ban.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanRecord {
    pub id: String,
    pub target: BanTarget,
    pub reason: Option<String>,
    pub banned_until: Option<NaiveDateTime>,
    pub banned_by: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum BanTarget {
    User(String),
    Session(String),
}

impl BanRecord {
    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        match self.banned_until {
            None => true,
            Some(until) => until > now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn chapter_id_rejects_invalid_characters() {
        assert!(ChapterId::new("solo-leveling-110").is_ok());
        assert!(ChapterId::new("Solo_Leveling").is_err());
        assert!(ChapterId::new("").is_err());
    }

    #[test]
    fn permanent_ban_never_expires() {
        let now = Utc::now().naive_utc();
        let ban = BanRecord {
            id: "b1".into(),
            target: BanTarget::User("u1".into()),
            reason: None,
            banned_until: None,
            banned_by: "admin".into(),
            created_at: now,
        };
        assert!(ban.is_active(now + chrono::Duration::days(3650)));
    }

    #[test]
    fn timed_ban_expires() {
        let now = Utc::now().naive_utc();
        let ban = BanRecord {
            id: "b2".into(),
            target: BanTarget::Session("s1".into()),
            reason: Some("spam".into()),
            banned_until: Some(now + chrono::Duration::hours(1)),
            banned_by: "admin".into(),
            created_at: now,
        };
        assert!(ban.is_active(now));
        assert!(!ban.is_active(now + chrono::Duration::hours(2)));
    }
}
