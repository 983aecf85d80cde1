use crate::{models::SqlProfile, Db};
use chrono::Utc;
use domain::{Profile, Role};

impl Db {
    pub async fn get_profile(&self, user_id: &str) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, SqlProfile>(
            "SELECT user_id, display_name, role, created_at FROM profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile.map(Into::into))
    }

    pub async fn upsert_profile(
        &self,
        user_id: &str,
        display_name: &str,
        role: Role,
    ) -> anyhow::Result<()> {
        let now = Utc::now().naive_utc();
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, display_name, role, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                display_name = excluded.display_name,
                role = excluded.role
            "#,
        )
        .bind(user_id)
        .bind(display_name)
        .bind(role.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns false when no such user exists.
    pub async fn set_role(&self, user_id: &str, role: Role) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE profiles SET role = ? WHERE user_id = ?")
            .bind(role.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
