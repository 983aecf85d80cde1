use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
    Love,
    Laugh,
    Angry,
    Sad,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 6] = [
        ReactionKind::Like,
        ReactionKind::Dislike,
        ReactionKind::Love,
        ReactionKind::Laugh,
        ReactionKind::Angry,
        ReactionKind::Sad,
    ];

    pub fn parse(s: &str) -> Option<ReactionKind> {
        match s {
            "like" => Some(ReactionKind::Like),
            "dislike" => Some(ReactionKind::Dislike),
            "love" => Some(ReactionKind::Love),
            "laugh" => Some(ReactionKind::Laugh),
            "angry" => Some(ReactionKind::Angry),
            "sad" => Some(ReactionKind::Sad),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
            ReactionKind::Love => "love",
            ReactionKind::Laugh => "laugh",
            ReactionKind::Angry => "angry",
            ReactionKind::Sad => "sad",
        }
    }
}

/// One row per (comment, user); choosing a new kind replaces the old row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub comment_id: String,
    pub user_id: String,
    pub kind: ReactionKind,
    pub created_at: NaiveDateTime,
}

/// Per-kind counts, always carrying all six kinds so clients need no
/// defaulting. Recomputed from rows on every read; there is no cached
/// counter to drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionTally(pub BTreeMap<ReactionKind, u64>);

impl ReactionTally {
    pub fn empty() -> Self {
        Self(ReactionKind::ALL.iter().map(|k| (*k, 0)).collect())
    }

    pub fn count(&self, kind: ReactionKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

/// Tallies current rows for one comment. The at-most-one-row-per-user
/// invariant makes the total equal the number of distinct reacting users.
pub fn tally(rows: &[Reaction]) -> ReactionTally {
    let mut t = ReactionTally::empty();
    for row in rows {
        *t.0.entry(row.kind).or_insert(0) += 1;
    }
    t
}

pub fn user_reaction(rows: &[Reaction], user_id: &str) -> Option<ReactionKind> {
    rows.iter().find(|r| r.user_id == user_id).map(|r| r.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(user: &str, kind: ReactionKind) -> Reaction {
        Reaction {
            comment_id: "c1".into(),
            user_id: user.into(),
            kind,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn tally_counts_per_kind_with_zeros() {
        let rows = vec![
            row("u1", ReactionKind::Like),
            row("u2", ReactionKind::Like),
            row("u3", ReactionKind::Love),
        ];
        let t = tally(&rows);
        assert_eq!(t.count(ReactionKind::Like), 2);
        assert_eq!(t.count(ReactionKind::Love), 1);
        assert_eq!(t.count(ReactionKind::Sad), 0);
        assert_eq!(t.total(), 3);
    }

    #[test]
    fn total_equals_distinct_users_under_replace_semantics() {
        // u1 switched from like to love: only the final row exists.
        let rows = vec![row("u1", ReactionKind::Love), row("u2", ReactionKind::Like)];
        let t = tally(&rows);
        assert_eq!(t.count(ReactionKind::Like), 1);
        assert_eq!(t.count(ReactionKind::Love), 1);
        assert_eq!(t.total(), 2);
        assert_eq!(user_reaction(&rows, "u1"), Some(ReactionKind::Love));
        assert_eq!(user_reaction(&rows, "u9"), None);
    }

    #[test]
    fn unknown_kind_string_is_rejected() {
        assert_eq!(ReactionKind::parse("wow"), None);
        assert_eq!(ReactionKind::parse("love"), Some(ReactionKind::Love));
    }
}
