use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// Issues and verifies session tokens of the form
/// `base64url("<user_id>:<expires_at>").hex(hmac_sha256)`.
#[derive(Clone)]
pub struct TokenAuthority {
    key: Vec<u8>,
    ttl: Duration,
}

impl TokenAuthority {
    pub fn new(key: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            key: key.as_ref().to_vec(),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> String {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    pub fn issue_at(&self, user_id: i64, now: i64) -> String {
        let expires_at = now.saturating_add(i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX));
        let payload = URL_SAFE_NO_PAD.encode(format!("{}:{}", user_id, expires_at));
        let signature = hex::encode(self.mac(payload.as_bytes()).finalize().into_bytes());
        format!("{}.{}", payload, signature)
    }

    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<i64, TokenError> {
        let (payload, signature) = token.trim().split_once('.').ok_or(TokenError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;
        self.mac(payload.as_bytes())
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let decoded = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let decoded = String::from_utf8(decoded).map_err(|_| TokenError::Malformed)?;
        let (user_id, expires_at) = decoded.split_once(':').ok_or(TokenError::Malformed)?;
        let user_id: i64 = user_id.parse().map_err(|_| TokenError::Malformed)?;
        let expires_at: i64 = expires_at.parse().map_err(|_| TokenError::Malformed)?;

        if now >= expires_at {
            return Err(TokenError::Expired);
        }
        Ok(user_id)
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("hmac takes any key length");
        mac.update(data);
        mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> TokenAuthority {
        TokenAuthority::new("secret", Duration::from_secs(60))
    }

    #[test]
    fn test_token_flow() {
        let auth = authority();
        let token = auth.issue_at(42, 1_000);

        assert_eq!(auth.verify_at(&token, 1_000), Ok(42));
        assert_eq!(auth.verify_at(&token, 1_059), Ok(42));
        assert_eq!(auth.verify_at(&token, 1_060), Err(TokenError::Expired));
    }

    #[test]
    fn test_foreign_key_rejected() {
        let token = TokenAuthority::new("other", Duration::from_secs(60)).issue_at(42, 1_000);
        assert_eq!(authority().verify_at(&token, 1_000), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let auth = authority();
        let token = auth.issue_at(42, 1_000);
        let (_, sig) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", URL_SAFE_NO_PAD.encode("1:99999"), sig);
        assert_eq!(auth.verify_at(&forged, 1_000), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let auth = authority();
        assert_eq!(auth.verify_at("garbage", 0), Err(TokenError::Malformed));
        assert_eq!(auth.verify_at("abc.zz", 0), Err(TokenError::Malformed));
    }
}
