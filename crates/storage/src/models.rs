use chrono::NaiveDateTime;
use domain::{Comment, Page, Site, User};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlSite {
    pub id: i64,
    pub name: String,
    /// Comma separated.
    pub urls: String,
}

impl From<SqlSite> for Site {
    fn from(sql: SqlSite) -> Self {
        Site {
            id: sql.id,
            name: sql.name,
            urls: split_urls(&sql.urls),
        }
    }
}

pub fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(FromRow)]
pub struct SqlPage {
    pub id: i64,
    pub page_key: String,
    pub site_name: String,
    pub title: String,
    pub admin_only: bool,
}

impl From<SqlPage> for Page {
    fn from(sql: SqlPage) -> Self {
        Page {
            id: sql.id,
            key: sql.page_key,
            site_name: sql.site_name,
            title: sql.title,
            admin_only: sql.admin_only,
        }
    }
}

#[derive(FromRow)]
pub struct SqlUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub link: String,
    pub last_ip: String,
    pub last_ua: String,
    pub is_admin: bool,
    pub is_registered: bool,
}

impl From<SqlUser> for User {
    fn from(sql: SqlUser) -> Self {
        User {
            id: sql.id,
            name: sql.name,
            email: sql.email,
            link: sql.link,
            last_ip: sql.last_ip,
            last_ua: sql.last_ua,
            is_admin: sql.is_admin,
            is_registered: sql.is_registered,
        }
    }
}

#[derive(FromRow)]
pub struct SqlComment {
    pub id: i64,
    pub content: String,
    pub page_key: String,
    pub site_name: String,
    pub user_id: i64,
    pub ip: String,
    pub ua: String,
    pub rid: i64,
    pub root_id: i64,
    pub is_pending: bool,
    pub is_collapsed: bool,
    pub is_pinned: bool,
    pub is_verified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        Comment {
            id: sql.id,
            content: sql.content,
            page_key: sql.page_key,
            site_name: sql.site_name,
            user_id: sql.user_id,
            ip: sql.ip,
            ua: sql.ua,
            rid: sql.rid,
            root_id: sql.root_id,
            is_pending: sql.is_pending,
            is_collapsed: sql.is_collapsed,
            is_pinned: sql.is_pinned,
            is_verified: sql.is_verified,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
        }
    }
}
