use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::CommentError;
use tracing::error;

/// HTTP face of [`CommentError`]. Internal causes are logged, never sent.
#[derive(Debug)]
pub struct ApiError(pub CommentError);

impl From<CommentError> for ApiError {
    fn from(err: CommentError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            CommentError::Validation(_)
            | CommentError::ReplyPageMismatch
            | CommentError::ReplyNotAllowed => StatusCode::BAD_REQUEST,
            CommentError::NotFound(_) => StatusCode::NOT_FOUND,
            CommentError::PermissionDenied => StatusCode::FORBIDDEN,
            CommentError::Unauthenticated => StatusCode::UNAUTHORIZED,
            CommentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = serde_json::json!({ "msg": self.0.to_string() });

        match &self.0 {
            CommentError::PermissionDenied => body["need_login"] = true.into(),
            CommentError::Unauthenticated => body["need_auth_login"] = true.into(),
            CommentError::Internal(e) => error!("[CommentCreate] {:?}", e),
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (CommentError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (CommentError::ReplyPageMismatch, StatusCode::BAD_REQUEST),
            (CommentError::ReplyNotAllowed, StatusCode::BAD_REQUEST),
            (CommentError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CommentError::PermissionDenied, StatusCode::FORBIDDEN),
            (CommentError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                CommentError::Internal(anyhow::anyhow!("db locked")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
