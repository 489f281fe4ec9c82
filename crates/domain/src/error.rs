use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("{0}")]
    Validation(String),

    #[error("Inconsistent with the page_key of the parent comment")]
    ReplyPageMismatch,

    #[error("Cannot reply to this comment")]
    ReplyNotAllowed,

    #[error("{0} not found")]
    NotFound(String),

    /// The frontend should prompt the admin login.
    #[error("Admin access required")]
    PermissionDenied,

    /// A token was supplied but does not resolve to a user.
    #[error("Login required")]
    Unauthenticated,

    #[error("Comment failed")]
    Internal(#[source] anyhow::Error),
}

impl CommentError {
    pub fn internal(step: &'static str, err: anyhow::Error) -> Self {
        Self::Internal(err.context(step))
    }
}
