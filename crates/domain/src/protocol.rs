use crate::{commands::CreateCommentParams, error::CommentError};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

// ASCII word characters only
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+([-+.][A-Za-z0-9_]+)*@[A-Za-z0-9_]+([-.][A-Za-z0-9_]+)*\.[A-Za-z0-9_]+([-.][A-Za-z0-9_]+)*$")
        .expect("email pattern compiles")
});

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Only absolute http(s) URLs with a host are accepted as profile links.
pub fn validate_url(link: &str) -> bool {
    match Url::parse(link) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Input checks that need no I/O, in the order clients see them reported.
pub fn validate_params(p: &CreateCommentParams) -> Result<(), CommentError> {
    if p.name.trim().is_empty() {
        return Err(CommentError::Validation("Nickname cannot be empty".into()));
    }
    if p.email.trim().is_empty() {
        return Err(CommentError::Validation("Email cannot be empty".into()));
    }
    if !validate_email(&p.email) {
        return Err(CommentError::Validation("Invalid Email".into()));
    }
    if !p.link.is_empty() && !validate_url(&p.link) {
        return Err(CommentError::Validation("Invalid Link".into()));
    }
    if p.content.is_empty() {
        return Err(CommentError::Validation("Content cannot be empty".into()));
    }
    if p.page_key.is_empty() {
        return Err(CommentError::Validation("page_key cannot be empty".into()));
    }
    if p.site_name.trim().is_empty() {
        return Err(CommentError::Validation("site_name cannot be empty".into()));
    }
    Ok(())
}
