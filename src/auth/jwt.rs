//! Session token codec
//!
//! Signed, time-boxed session tokens. A token carries the subject id, the
//! username, and the per-login anti-forgery value; everything else the server
//! needs is re-derived per request, so there is no server-side session table.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims embedded in every session token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject id
    pub sub: Uuid,
    /// Subject username
    pub username: String,
    /// Anti-forgery value, generated fresh at login
    pub csrf: String,
    /// Issued-at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Token issuer
    pub iss: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The embedded expiry has passed.
    #[error("token expired")]
    Expired,
    /// Anything else: bad signature, wrong issuer, unparseable claims.
    #[error("invalid token")]
    Malformed,
}

/// Encode/decode pair for session tokens. Pure; no I/O.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl TokenService {
    pub const ISSUER: &'static str = "movie-server";

    /// Create a token service with the given signing secret and lifetime.
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::default();
        validation.set_issuer(&[Self::ISSUER]);
        // Expiry is exact, not fuzzy.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: Self::ISSUER.to_string(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Sign a token for a subject. Expiry is absolute: issuance time plus the
    /// configured TTL.
    pub fn issue(&self, subject: Uuid, username: &str, csrf: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject,
            username: username.to_string(),
            csrf: csrf.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|_| TokenError::Malformed)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test_secret", 3600)
    }

    #[test]
    fn issue_verify_roundtrip() {
        let tokens = service();
        let subject = Uuid::new_v4();

        let token = tokens.issue(subject, "alice", "csrf-value").unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, subject);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.csrf, "csrf-value");
        assert_eq!(claims.iss, TokenService::ISSUER);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let tokens = service();
        let now = Utc::now();
        // Hand-build a token whose expiry is already in the past but whose
        // signature is valid.
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "alice".to_string(),
            csrf: "csrf-value".to_string(),
            iat: (now - Duration::seconds(7200)).timestamp(),
            exp: (now - Duration::seconds(3600)).timestamp(),
            iss: TokenService::ISSUER.to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret"),
        )
        .unwrap();

        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let token = service()
            .issue(Uuid::new_v4(), "alice", "csrf-value")
            .unwrap();
        let other = TokenService::new("another_secret", 3600);
        assert_eq!(other.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            service().verify("not.a.token"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn wrong_issuer_is_malformed() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "alice".to_string(),
            csrf: "csrf-value".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            iss: "someone-else".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret"),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::Malformed));
    }
}
