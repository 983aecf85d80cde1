use crate::Db;
use chrono::Utc;

impl Db {
    pub async fn ensure_chapter(
        &self,
        chapter_id: &str,
        manga_slug: &str,
        title: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chapters (id, manga_slug, title, views, created_at)
            VALUES (?, ?, ?, 0, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(chapter_id)
        .bind(manga_slug)
        .bind(title)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn chapter_exists(&self, chapter_id: &str) -> anyhow::Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM chapters WHERE id = ?")
            .bind(chapter_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Single-statement increment. A read-then-write here would undercount
    /// under concurrent views; the RETURNING form closes that race.
    pub async fn increment_views(&self, chapter_id: &str) -> anyhow::Result<Option<i64>> {
        let row: Option<(i64,)> =
            sqlx::query_as("UPDATE chapters SET views = views + 1 WHERE id = ? RETURNING views")
                .bind(chapter_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(views,)| views))
    }
}
