use crate::{models::SqlSite, Db};
use domain::Site;

impl Db {
    pub async fn find_site(&self, name: &str) -> anyhow::Result<Option<Site>> {
        let row = sqlx::query_as::<_, SqlSite>("SELECT id, name, urls FROM sites WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    // 配置中声明的站点，启动时写入
    pub async fn seed_site(&self, name: &str, urls: &[String]) -> anyhow::Result<Site> {
        sqlx::query(
            r#"
            INSERT INTO sites (name, urls) VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET urls = excluded.urls
            "#,
        )
        .bind(name)
        .bind(urls.join(","))
        .execute(&self.pool)
        .await?;

        self.find_site(name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("site {} vanished after seeding", name))
    }
}

#[cfg(test)]
mod tests {
    use crate::Db;

    #[tokio::test]
    async fn seed_site_is_idempotent_and_updates_urls() {
        let db = Db::memory().await;
        assert!(db.find_site("demo").await.unwrap().is_none());

        let first = db
            .seed_site("demo", &["https://a.example".to_string()])
            .await
            .unwrap();
        let second = db
            .seed_site(
                "demo",
                &["https://b.example".to_string(), "https://c.example".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.urls, vec!["https://b.example", "https://c.example"]);
    }
}
