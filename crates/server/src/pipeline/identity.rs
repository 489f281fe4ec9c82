use adapter::CommentStore;
use domain::{CommentError, CreateCommentParams, User};
use tracing::debug;

use crate::auth::TokenAuthority;

/// Outcome of reading the session token, before any write happens.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// No token supplied.
    Anonymous,
    Authenticated(User),
    /// A token was supplied but does not resolve to a known user.
    Invalid,
}

impl Credentials {
    /// Admin access means a valid session of an admin user.
    pub fn is_admin(&self) -> bool {
        matches!(self, Credentials::Authenticated(u) if u.is_admin)
    }
}

pub async fn resolve_credentials(
    store: &dyn CommentStore,
    tokens: &TokenAuthority,
    token: Option<&str>,
) -> Result<Credentials, CommentError> {
    let token = match token.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Ok(Credentials::Anonymous),
    };

    let user_id = match tokens.verify(token) {
        Ok(id) => id,
        Err(e) => {
            debug!("Rejected session token: {}", e);
            return Ok(Credentials::Invalid);
        }
    };

    let user = store
        .find_user_by_id(user_id)
        .await
        .map_err(|e| CommentError::internal("get user", e))?;

    Ok(match user {
        Some(u) => Credentials::Authenticated(u),
        None => Credentials::Invalid,
    })
}

/// Settles who the comment belongs to. Anonymous posters are found or
/// created by name and email, and their profile is refreshed with what they
/// just submitted. Returns the user and whether the identity is verified.
pub async fn resolve_poster(
    store: &dyn CommentStore,
    credentials: Credentials,
    p: &CreateCommentParams,
    ip: &str,
    ua: &str,
) -> Result<(User, bool), CommentError> {
    match credentials {
        Credentials::Authenticated(user) => Ok((user, true)),
        Credentials::Invalid => Err(CommentError::Unauthenticated),
        Credentials::Anonymous => {
            let mut user = store
                .find_create_user(&p.name, &p.email, &p.link)
                .await
                .map_err(|e| CommentError::internal("create user", e))?;

            user.link = p.link.clone();
            user.last_ip = ip.to_string();
            user.last_ua = ua.to_string();
            // keeps a change of name casing
            user.name = p.name.clone();
            user.email = p.email.clone();

            store
                .update_user(&user)
                .await
                .map_err(|e| CommentError::internal("update user", e))?;

            Ok((user, false))
        }
    }
}
