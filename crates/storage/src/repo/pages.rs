use crate::{models::SqlPage, Db};
use domain::Page;

impl Db {
    /// Returns the page for `key` within `site_name`, creating it on first use.
    /// `title` only applies to a newly created page.
    pub async fn find_create_page(
        &self,
        key: &str,
        title: &str,
        site_name: &str,
    ) -> anyhow::Result<Page> {
        sqlx::query(
            r#"
            INSERT INTO pages (page_key, site_name, title, admin_only)
            VALUES (?, ?, ?, FALSE)
            ON CONFLICT(page_key, site_name) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(site_name)
        .bind(title)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, SqlPage>(
            r#"
            SELECT id, page_key, site_name, title, admin_only
            FROM pages
            WHERE page_key = ? AND site_name = ?
            "#,
        )
        .bind(key)
        .bind(site_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn update_page_title(&self, page_id: i64, title: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE pages SET title = ? WHERE id = ?")
            .bind(title)
            .bind(page_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_page_admin_only(&self, page_id: i64, admin_only: bool) -> anyhow::Result<()> {
        sqlx::query("UPDATE pages SET admin_only = ? WHERE id = ?")
            .bind(admin_only)
            .bind(page_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
