use adapter::CommentStore;
use domain::CommentError;

use super::identity::Credentials;

/// Admin check first, token validity second.
pub fn decide(
    is_admin_identity: bool,
    page_admin_only: bool,
    credentials: &Credentials,
) -> Result<(), CommentError> {
    if (is_admin_identity || page_admin_only) && !credentials.is_admin() {
        return Err(CommentError::PermissionDenied);
    }
    if matches!(credentials, Credentials::Invalid) {
        return Err(CommentError::Unauthenticated);
    }
    Ok(())
}

pub async fn check_allow_comment(
    store: &dyn CommentStore,
    name: &str,
    email: &str,
    page_admin_only: bool,
    credentials: &Credentials,
) -> Result<(), CommentError> {
    let is_admin_identity = store
        .is_admin_by_name_email(name, email)
        .await
        .map_err(|e| CommentError::internal("check admin identity", e))?;
    decide(is_admin_identity, page_admin_only, credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::User;

    fn user(is_admin: bool) -> Credentials {
        Credentials::Authenticated(User {
            id: 1,
            name: "u".into(),
            email: "u@example.com".into(),
            link: String::new(),
            last_ip: String::new(),
            last_ua: String::new(),
            is_admin,
            is_registered: true,
        })
    }

    #[test]
    fn anonymous_on_open_page_passes() {
        assert!(decide(false, false, &Credentials::Anonymous).is_ok());
        assert!(decide(false, false, &user(false)).is_ok());
    }

    #[test]
    fn admin_identity_or_page_needs_admin_session() {
        for (identity, page) in [(true, false), (false, true), (true, true)] {
            assert!(matches!(
                decide(identity, page, &Credentials::Anonymous),
                Err(CommentError::PermissionDenied)
            ));
            assert!(matches!(
                decide(identity, page, &user(false)),
                Err(CommentError::PermissionDenied)
            ));
            assert!(decide(identity, page, &user(true)).is_ok());
        }
    }

    #[test]
    fn invalid_token_is_unauthenticated() {
        assert!(matches!(
            decide(false, false, &Credentials::Invalid),
            Err(CommentError::Unauthenticated)
        ));
    }

    #[test]
    fn admin_gate_is_evaluated_before_token_validity() {
        assert!(matches!(
            decide(false, true, &Credentials::Invalid),
            Err(CommentError::PermissionDenied)
        ));
    }
}
