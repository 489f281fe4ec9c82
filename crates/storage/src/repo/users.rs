use crate::{models::SqlUser, Db};
use chrono::Utc;
use domain::User;

const USER_COLUMNS: &str =
    "id, name, email, link, last_ip, last_ua, is_admin, is_registered";

impl Db {
    pub async fn find_user_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, SqlUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Name and email are matched case-insensitively.
    pub async fn find_user_by_name_email(
        &self,
        name: &str,
        email: &str,
    ) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, SqlUser>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE LOWER(name) = LOWER(?) AND LOWER(email) = LOWER(?)
            ORDER BY id ASC
            LIMIT 1
            "#
        ))
        .bind(name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    pub async fn find_create_user(
        &self,
        name: &str,
        email: &str,
        link: &str,
    ) -> anyhow::Result<User> {
        if let Some(user) = self.find_user_by_name_email(name, email).await? {
            return Ok(user);
        }

        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            r#"
            INSERT INTO users (name, email, link, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(link)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        tracing::debug!("Created anonymous user {} ({})", id, name);

        self.find_user_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {} vanished after insert", id))
    }

    pub async fn update_user(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, link = ?, last_ip = ?, last_ua = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.link)
        .bind(&user.last_ip)
        .bind(&user.last_ua)
        .bind(Utc::now().naive_utc())
        .bind(user.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn is_admin_by_name_email(&self, name: &str, email: &str) -> anyhow::Result<bool> {
        Ok(self
            .find_user_by_name_email(name, email)
            .await?
            .is_some_and(|u| u.is_admin))
    }

    // 配置中声明的管理员，启动时写入或提升
    pub async fn seed_admin(&self, name: &str, email: &str) -> anyhow::Result<User> {
        let user = self.find_create_user(name, email, "").await?;
        sqlx::query("UPDATE users SET is_admin = TRUE, is_registered = TRUE WHERE id = ?")
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        self.find_user_by_id(user.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("admin {} vanished after seeding", name))
    }

    pub async fn count_users(&self) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
