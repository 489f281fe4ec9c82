use anyhow::Result;
use async_trait::async_trait;
use domain::{AntiSpamCheckPayload, Comment, NewComment, Page, Site, User};

/// Durable storage of sites, pages, users and comments.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn find_site(&self, name: &str) -> Result<Option<Site>>;
    async fn find_create_page(&self, key: &str, title: &str, site_name: &str) -> Result<Page>;
    async fn update_page_title(&self, page_id: i64, title: &str) -> Result<()>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_create_user(&self, name: &str, email: &str, link: &str) -> Result<User>;
    async fn update_user(&self, user: &User) -> Result<()>;
    async fn is_admin_by_name_email(&self, name: &str, email: &str) -> Result<bool>;

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>>;
    async fn find_comment_root_id(&self, rid: i64) -> Result<i64>;
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment>;
    async fn block_comment(&self, id: i64) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpamVerdict {
    Clean,
    Spam { reason: String },
}

#[async_trait]
pub trait AntiSpam: Send + Sync {
    async fn check(&self, payload: &AntiSpamCheckPayload<'_>) -> Result<SpamVerdict>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn push(&self, comment: &Comment, parent: Option<&Comment>) -> Result<()>;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// `Ok(None)` when the document carries no usable title.
    async fn fetch_title(&self, url: &str) -> Result<Option<String>>;
}

pub trait IpRegionLookup: Send + Sync {
    fn query(&self, ip: &str) -> Result<String>;
}
