use adapter::CommentStore;
use domain::{Comment, CommentError};

fn parent_not_found() -> CommentError {
    CommentError::NotFound("Parent comment".into())
}

/// Loads the parent of a reply. `rid == 0` is a top-level comment.
pub async fn validate_reply_target(
    store: &dyn CommentStore,
    rid: u64,
    page_key: &str,
) -> Result<Option<Comment>, CommentError> {
    if rid == 0 {
        return Ok(None);
    }
    let id = i64::try_from(rid).map_err(|_| parent_not_found())?;

    let parent = store
        .find_comment(id)
        .await
        .map_err(|e| CommentError::internal("find parent comment", e))?
        .ok_or_else(parent_not_found)?;

    check_parent(&parent, page_key)?;
    Ok(Some(parent))
}

pub fn check_parent(parent: &Comment, page_key: &str) -> Result<(), CommentError> {
    if parent.page_key != page_key {
        return Err(CommentError::ReplyPageMismatch);
    }
    if !parent.is_allow_reply() {
        return Err(CommentError::ReplyNotAllowed);
    }
    Ok(())
}
