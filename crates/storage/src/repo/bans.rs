use crate::{models::SqlBan, Db};
use chrono::{NaiveDateTime, Utc};
use domain::{BanRecord, BanTarget};

impl Db {
    /// Finds an active ban for either identifier. Active means
    /// `banned_until IS NULL` (permanent) or still in the future.
    pub async fn find_active_ban(
        &self,
        user_id: Option<&str>,
        session_id: Option<&str>,
    ) -> anyhow::Result<Option<BanRecord>> {
        let now = Utc::now().naive_utc();
        let row = sqlx::query_as::<_, SqlBan>(
            r#"
            SELECT id, user_id, session_id, reason, banned_until, banned_by, created_at
            FROM bans
            WHERE (user_id = ? OR session_id = ?)
              AND (banned_until IS NULL OR banned_until > ?)
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(session_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    pub async fn insert_ban(
        &self,
        id: &str,
        target: &BanTarget,
        reason: Option<&str>,
        banned_until: Option<NaiveDateTime>,
        banned_by: &str,
    ) -> anyhow::Result<()> {
        let (user_id, session_id) = match target {
            BanTarget::User(u) => (Some(u.as_str()), None),
            BanTarget::Session(s) => (None, Some(s.as_str())),
        };
        sqlx::query(
            r#"
            INSERT INTO bans (id, user_id, session_id, reason, banned_until, banned_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(session_id)
        .bind(reason)
        .bind(banned_until)
        .bind(banned_by)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn lift_ban(&self, ban_id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM bans WHERE id = ?")
            .bind(ban_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
