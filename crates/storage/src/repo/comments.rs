use crate::{models::SqlComment, Db};
use chrono::NaiveDateTime;
use domain::Comment;

const COMMENT_COLUMNS: &str = "id, chapter_id, author_id, author_name, author_role, body, \
     parent_id, is_pinned, is_spoiler, is_deleted, needs_review, \
     deleted_by, deleted_reason, created_at, updated_at";

impl Db {
    pub async fn insert_comment(&self, c: &Comment) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (
                id, chapter_id, author_id, author_name, author_role, body,
                parent_id, is_pinned, is_spoiler, is_deleted, needs_review,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&c.id)
        .bind(c.chapter_id.as_str())
        .bind(&c.author_id)
        .bind(&c.author_name)
        .bind(c.author_role.as_str())
        .bind(&c.body)
        .bind(c.parent_id())
        .bind(c.is_pinned())
        .bind(c.is_spoiler)
        .bind(c.is_deleted)
        .bind(c.needs_review)
        .bind(c.created_at)
        .bind(c.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_comment(&self, comment_id: &str) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?"
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Active projection: tombstones excluded. Threading and pinned-first
    /// ordering happen in the domain layer over this flat listing.
    pub async fn list_active_comments(&self, chapter_id: &str) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE chapter_id = ? AND is_deleted = FALSE \
             ORDER BY created_at ASC"
        ))
        .bind(chapter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Audit projection: includes tombstones, for moderation review.
    pub async fn list_all_comments(&self, chapter_id: &str) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE chapter_id = ? \
             ORDER BY created_at ASC"
        ))
        .bind(chapter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_comment_body(
        &self,
        comment_id: &str,
        body: &str,
        needs_review: bool,
        is_spoiler: Option<bool>,
        updated_at: NaiveDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE comments
            SET body = ?, needs_review = ?, is_spoiler = COALESCE(?, is_spoiler), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(body)
        .bind(needs_review)
        .bind(is_spoiler)
        .bind(updated_at)
        .bind(comment_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Tombstone flip: the row stays for the audit trail, default listings
    /// stop returning it.
    pub async fn tombstone_comment(
        &self,
        comment_id: &str,
        deleted_by: &str,
        reason: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE comments
            SET is_deleted = TRUE, deleted_by = ?, deleted_reason = ?
            WHERE id = ?
            "#,
        )
        .bind(deleted_by)
        .bind(reason)
        .bind(comment_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_comment_pinned(&self, comment_id: &str, pinned: bool) -> anyhow::Result<()> {
        sqlx::query("UPDATE comments SET is_pinned = ? WHERE id = ?")
            .bind(pinned)
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn review_queue(&self) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE needs_review = TRUE AND is_deleted = FALSE \
             ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn resolve_review(&self, comment_id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE comments SET needs_review = FALSE WHERE id = ?")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recent non-deleted bodies by one author, newest first. Feeds the
    /// near-duplicate spam check.
    pub async fn recent_bodies_by_author(
        &self,
        author_id: &str,
        limit: i64,
    ) -> anyhow::Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT body FROM comments
            WHERE author_id = ? AND is_deleted = FALSE
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(body,)| body).collect())
    }
}
