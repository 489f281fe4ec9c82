use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A registered site; every page and comment is scoped to one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub name: String,
    pub urls: Vec<String>,
}

impl Site {
    pub fn first_url(&self) -> Option<&str> {
        self.urls
            .iter()
            .map(|u| u.trim())
            .find(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub link: String,
    pub last_ip: String,
    pub last_ua: String,
    pub is_admin: bool,
    /// Registered users own a login; anonymous posters are created on the fly.
    pub is_registered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub key: String,
    pub site_name: String,
    pub title: String,
    pub admin_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookedPage {
    pub id: i64,
    pub key: String,
    pub url: String,
    pub title: String,
    pub admin_only: bool,
    pub site_name: String,
}

impl Page {
    /// Resolves the public URL of the page: an absolute key wins, otherwise the
    /// key is joined onto the site's first URL. Empty when neither applies.
    pub fn cook(&self, site: Option<&Site>) -> CookedPage {
        let url = if is_absolute_http(&self.key) {
            self.key.clone()
        } else {
            match site.and_then(Site::first_url) {
                Some(base) => join_url(base, &self.key),
                None => String::new(),
            }
        };

        CookedPage {
            id: self.id,
            key: self.key.clone(),
            url,
            title: self.title.clone(),
            admin_only: self.admin_only,
            site_name: self.site_name.clone(),
        }
    }
}

fn is_absolute_http(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn join_url(base: &str, key: &str) -> String {
    if key.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

/// A comment ready to be persisted; the store assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
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
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub page_key: String,
    pub site_name: String,
    pub user_id: i64,
    pub ip: String,
    pub ua: String,
    /// Parent comment id, 0 for a top-level comment.
    pub rid: i64,
    pub root_id: i64,
    pub is_pending: bool,
    pub is_collapsed: bool,
    pub is_pinned: bool,
    pub is_verified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Comment {
    pub fn is_allow_reply(&self) -> bool {
        !self.is_collapsed && !self.is_pending
    }

    pub fn cook(&self, user: &User, page_url: &str) -> CookedComment {
        CookedComment {
            id: self.id,
            content: self.content.clone(),
            user_id: self.user_id,
            nick: user.name.clone(),
            email_encrypted: email_digest(&user.email),
            link: user.link.clone(),
            ua: self.ua.clone(),
            date: self.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            is_collapsed: self.is_collapsed,
            is_pending: self.is_pending,
            is_pinned: self.is_pinned,
            is_allow_reply: self.is_allow_reply(),
            is_verified: self.is_verified,
            rid: self.rid,
            root_id: self.root_id,
            page_key: self.page_key.clone(),
            page_url: page_url.to_string(),
            site_name: self.site_name.clone(),
            ip: self.ip.clone(),
            ip_region: String::new(),
        }
    }
}

/// Avatar services key on a digest of the lower-cased address.
fn email_digest(email: &str) -> String {
    hex::encode(Sha256::digest(email.trim().to_lowercase().as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookedComment {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub nick: String,
    pub email_encrypted: String,
    pub link: String,
    pub ua: String,
    pub date: String,
    pub is_collapsed: bool,
    pub is_pending: bool,
    pub is_pinned: bool,
    pub is_allow_reply: bool,
    pub is_verified: bool,
    pub rid: i64,
    pub root_id: i64,
    pub page_key: String,
    pub page_url: String,
    pub site_name: String,
    #[serde(skip)]
    pub ip: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_region: String,
}
