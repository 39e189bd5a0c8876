//! Session management
//!
//! Uses HMAC-signed tokens stored in cookies or bearer headers.
//! No server-side session storage needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User session data
///
/// Stored in a signed token. Contains the user info the identity
/// provider hands over at sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Stable user ID
    pub user_id: String,
    /// Display name
    pub name: Option<String>,
    /// Avatar URL
    pub image: Option<String>,
    /// When session was created
    pub created_at: DateTime<Utc>,
    /// When session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Create a signed session token
///
/// Token format: base64(payload).base64(hmac_sha256(payload))
///
/// # Arguments
/// * `session` - Session data to encode
/// * `secret` - HMAC secret key
///
/// # Returns
/// Signed token string
pub fn create_session_token(
    session: &Session,
    secret: &str,
) -> Result<String, crate::error::AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let payload =
        serde_json::to_string(session).map_err(|e| crate::error::AppError::Internal(e.into()))?;
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a session token
///
/// # Arguments
/// * `token` - Token string to verify
/// * `secret` - HMAC secret key
///
/// # Returns
/// Decoded session if valid
///
/// # Errors
/// Returns error if signature is invalid, token is malformed or expired
pub fn verify_session_token(token: &str, secret: &str) -> Result<Session, crate::error::AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let Some((payload_b64, signature_b64)) = token.split_once('.') else {
        return Err(crate::error::AppError::Unauthorized);
    };
    if signature_b64.contains('.') {
        return Err(crate::error::AppError::Unauthorized);
    }

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());

    let expected_signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    mac.verify_slice(&expected_signature)
        .map_err(|_| crate::error::AppError::InvalidSignature)?;

    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    let session: Session =
        serde_json::from_slice(&payload_bytes).map_err(|_| crate::error::AppError::Unauthorized)?;

    if session.is_expired() {
        return Err(crate::error::AppError::Unauthorized);
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-that-is-32-bytes!";

    fn session(expires_in: Duration) -> Session {
        Session {
            user_id: "user-1".to_string(),
            name: Some("Alice".to_string()),
            image: None,
            created_at: Utc::now(),
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn token_verifies_with_same_secret() {
        let token = create_session_token(&session(Duration::hours(1)), SECRET).unwrap();
        let verified = verify_session_token(&token, SECRET).unwrap();
        assert_eq!(verified.user_id, "user-1");
        assert_eq!(verified.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = create_session_token(&session(Duration::hours(1)), SECRET).unwrap();
        let result = verify_session_token(&token, "another-secret-key-that-is-32-bytes");
        assert!(matches!(result, Err(AppError::InvalidSignature)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_session_token(&session(Duration::hours(-1)), SECRET).unwrap();
        assert!(matches!(
            verify_session_token(&token, SECRET),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(matches!(
            verify_session_token("no-dot-here", SECRET),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            verify_session_token("a.b.c", SECRET),
            Err(AppError::Unauthorized)
        ));
    }
}
