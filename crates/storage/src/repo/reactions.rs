use crate::{models::SqlReaction, Db};
use chrono::Utc;
use domain::{reactions, Reaction, ReactionKind, ReactionTally};

impl Db {
    /// Replace semantics in a single statement: the (comment_id, user_id)
    /// key makes a new kind supersede the old row, so no reader ever
    /// observes a gap between a delete and an insert.
    pub async fn set_reaction(
        &self,
        comment_id: &str,
        user_id: &str,
        kind: ReactionKind,
    ) -> anyhow::Result<()> {
        let now = Utc::now().naive_utc();
        sqlx::query(
            r#"
            INSERT INTO reactions (comment_id, user_id, kind, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(comment_id, user_id) DO UPDATE SET
                kind = excluded.kind,
                created_at = excluded.created_at
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear_reaction(&self, comment_id: &str, user_id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM reactions WHERE comment_id = ? AND user_id = ?")
            .bind(comment_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn reactions_for(&self, comment_id: &str) -> anyhow::Result<Vec<Reaction>> {
        let rows = sqlx::query_as::<_, SqlReaction>(
            "SELECT comment_id, user_id, kind, created_at FROM reactions WHERE comment_id = ?",
        )
        .bind(comment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .filter_map(SqlReaction::into_domain)
            .collect())
    }

    /// Recomputed from current rows on every call.
    pub async fn reaction_tally(&self, comment_id: &str) -> anyhow::Result<ReactionTally> {
        let rows = self.reactions_for(comment_id).await?;
        Ok(reactions::tally(&rows))
    }

    pub async fn user_reaction(
        &self,
        comment_id: &str,
        user_id: &str,
    ) -> anyhow::Result<Option<ReactionKind>> {
        let rows = self.reactions_for(comment_id).await?;
        Ok(reactions::user_reaction(&rows, user_id))
    }
}

#[cfg(test)]
mod tests {
    use crate::Db;
    use chrono::Utc;
    use domain::ReactionKind;

    #[tokio::test]
    async fn unrecognized_stored_kind_is_skipped_not_counted() {
        let db = Db::new("sqlite::memory:").await.unwrap();

        // Seed the parent rows the reactions foreign keys point at.
        db.ensure_chapter("ch-1", "manga", "Chapter 1").await.unwrap();
        sqlx::query(
            r#"
            INSERT INTO comments (
                id, chapter_id, author_id, author_name, author_role, body,
                parent_id, is_pinned, is_spoiler, is_deleted, needs_review,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, 'user', ?, NULL, FALSE, FALSE, FALSE, FALSE, ?, ?)
            "#,
        )
        .bind("c1")
        .bind("ch-1")
        .bind("u1")
        .bind("author")
        .bind("body")
        .bind(Utc::now().naive_utc())
        .bind(Utc::now().naive_utc())
        .execute(&db.pool)
        .await
        .unwrap();

        db.set_reaction("c1", "u1", ReactionKind::Like).await.unwrap();

        // A row a future (or corrupted) deployment could leave behind.
        sqlx::query(
            "INSERT INTO reactions (comment_id, user_id, kind, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind("c1")
        .bind("u2")
        .bind("wow")
        .bind(Utc::now().naive_utc())
        .execute(&db.pool)
        .await
        .unwrap();

        let tally = db.reaction_tally("c1").await.unwrap();
        assert_eq!(tally.count(ReactionKind::Like), 1);
        assert_eq!(tally.total(), 1);
        assert_eq!(db.user_reaction("c1", "u2").await.unwrap(), None);
    }
}
