use crate::{models::SqlComment, Db};
use chrono::Utc;
use domain::{Comment, NewComment};
use std::collections::HashSet;

const COMMENT_COLUMNS: &str = r#"
    id, content, page_key, site_name, user_id, ip, ua, rid, root_id,
    is_pending, is_collapsed, is_pinned, is_verified, created_at, updated_at
"#;

impl Db {
    pub async fn create_comment(&self, c: &NewComment) -> anyhow::Result<Comment> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            r#"
            INSERT INTO comments (
                content, page_key, site_name, user_id, ip, ua, rid, root_id,
                is_pending, is_collapsed, is_pinned, is_verified,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&c.content)
        .bind(&c.page_key)
        .bind(&c.site_name)
        .bind(c.user_id)
        .bind(&c.ip)
        .bind(&c.ua)
        .bind(c.rid)
        .bind(c.root_id)
        .bind(c.is_pending)
        .bind(c.is_collapsed)
        .bind(c.is_pinned)
        .bind(c.is_verified)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.find_comment(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("comment {} vanished after insert", id))
    }

    pub async fn find_comment(&self, id: i64) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Id of the top-level ancestor of a reply to `rid`; 0 when `rid` is 0 or
    /// does not exist.
    pub async fn find_comment_root_id(&self, rid: i64) -> anyhow::Result<i64> {
        let mut current = rid;
        let mut seen = HashSet::new();
        while current != 0 {
            if !seen.insert(current) {
                tracing::warn!("Reply cycle detected at comment {}", current);
                return Ok(current);
            }
            match self.find_comment(current).await? {
                Some(c) if c.rid == 0 => return Ok(c.id),
                Some(c) => current = c.rid,
                None => return Ok(0),
            }
        }
        Ok(0)
    }

    // 反垃圾拦截：转为待审核
    pub async fn block_comment(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE comments SET is_pending = TRUE, updated_at = ? WHERE id = ?")
            .bind(Utc::now().naive_utc())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_comment_collapsed(&self, id: i64, collapsed: bool) -> anyhow::Result<()> {
        sqlx::query("UPDATE comments SET is_collapsed = ?, updated_at = ? WHERE id = ?")
            .bind(collapsed)
            .bind(Utc::now().naive_utc())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count_comments(&self) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
