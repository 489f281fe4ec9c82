use crate::models::{Comment, Page};
use serde::{Deserialize, Serialize};

/// Body of `POST /comments`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentParams {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub link: String,
    pub content: String,
    #[serde(default)]
    pub rid: u64,
    /// Client-corrected user agent. Replaces the request header when set.
    #[serde(default)]
    pub ua: String,
    pub page_key: String,
    #[serde(default)]
    pub page_title: String,
    pub site_name: String,
}

/// Transport facts about the incoming request, captured by the HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip: String,
    pub user_agent: String,
    pub referer: String,
    /// Raw session token; `None` when the client supplied none.
    pub token: Option<String>,
}

/// Handed to the anti-spam collaborator for a single check.
#[derive(Debug, Clone, Copy)]
pub struct AntiSpamCheckPayload<'a> {
    pub comment: &'a Comment,
    pub req_referer: &'a str,
    pub req_ip: &'a str,
    pub req_user_agent: &'a str,
}

/// Snapshot of everything the background enrichment needs. The worker owns
/// its copy; the request path never observes changes made to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentJob {
    pub comment: Comment,
    pub parent: Option<Comment>,
    pub page: Page,
    pub page_url: String,
    pub is_admin: bool,
    pub req_ip: String,
    pub req_user_agent: String,
    pub req_referer: String,
}

impl EnrichmentJob {
    pub fn spam_payload(&self) -> AntiSpamCheckPayload<'_> {
        AntiSpamCheckPayload {
            comment: &self.comment,
            req_referer: &self.req_referer,
            req_ip: &self.req_ip,
            req_user_agent: &self.req_user_agent,
        }
    }
}
