use domain::{CreateCommentParams, NewComment, Page, User};

/// Everything the new comment is built from, already validated.
pub struct CommentDraft<'a> {
    pub params: &'a CreateCommentParams,
    pub page: &'a Page,
    pub user: &'a User,
    pub ip: &'a str,
    pub ua: &'a str,
    pub rid: i64,
    pub root_id: i64,
    pub is_verified: bool,
    pub is_admin: bool,
}

impl CommentDraft<'_> {
    pub fn assemble(&self, pending_default: bool) -> NewComment {
        NewComment {
            content: self.params.content.clone(),
            page_key: self.page.key.clone(),
            site_name: self.params.site_name.clone(),
            user_id: self.user.id,
            ip: self.ip.to_string(),
            ua: self.ua.to_string(),
            rid: self.rid,
            root_id: self.root_id,
            is_pending: !self.is_admin && pending_default,
            is_collapsed: false,
            is_pinned: false,
            is_verified: self.is_verified,
        }
    }
}
