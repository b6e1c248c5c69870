//! Session token validation

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by a dashboard session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Tenant the session was issued for, if any
    #[serde(default)]
    pub tenant: Option<String>,
    /// User role
    #[serde(default)]
    pub role: Option<String>,
    /// Expiration
    pub exp: i64,
    /// Issued at
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Validates session tokens signed with the shared secret
#[derive(Clone)]
pub struct SessionValidator {
    decoding_key: DecodingKey,
}

impl SessionValidator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Validate and decode a token
    /// Explicit algorithm validation prevents algorithm confusion attacks
    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 60; // 60 second clock skew tolerance

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => SessionError::Invalid,
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => SessionError::Invalid,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => SessionError::Invalid,
                _ => SessionError::Validation(e.to_string()),
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No session token")]
    Missing,
    #[error("Session expired")]
    Expired,
    #[error("Invalid session token")]
    Invalid,
    #[error("Session validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn sign_for_tests(secret: &str, claims: &SessionClaims) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
pub(crate) fn claims_for_tests(sub: &str, ttl_secs: i64) -> SessionClaims {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    SessionClaims {
        sub: sub.to_string(),
        tenant: Some("acme".to_string()),
        role: Some("editor".to_string()),
        exp: now + ttl_secs,
        iat: Some(now),
    }
}
