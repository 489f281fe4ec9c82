use anyhow::Result;
use async_trait::async_trait;
use domain::{Comment, NewComment, Page, Site, User};
use storage::Db;

use crate::traits::CommentStore;

#[async_trait]
impl CommentStore for Db {
    async fn find_site(&self, name: &str) -> Result<Option<Site>> {
        Db::find_site(self, name).await
    }

    async fn find_create_page(&self, key: &str, title: &str, site_name: &str) -> Result<Page> {
        Db::find_create_page(self, key, title, site_name).await
    }

    async fn update_page_title(&self, page_id: i64, title: &str) -> Result<()> {
        Db::update_page_title(self, page_id, title).await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Db::find_user_by_id(self, id).await
    }

    async fn find_create_user(&self, name: &str, email: &str, link: &str) -> Result<User> {
        Db::find_create_user(self, name, email, link).await
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        Db::update_user(self, user).await
    }

    async fn is_admin_by_name_email(&self, name: &str, email: &str) -> Result<bool> {
        Db::is_admin_by_name_email(self, name, email).await
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>> {
        Db::find_comment(self, id).await
    }

    async fn find_comment_root_id(&self, rid: i64) -> Result<i64> {
        Db::find_comment_root_id(self, rid).await
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment> {
        Db::create_comment(self, comment).await
    }

    async fn block_comment(&self, id: i64) -> Result<()> {
        Db::block_comment(self, id).await
    }
}
