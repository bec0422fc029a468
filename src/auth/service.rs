//! Authentication service
//!
//! Login, session-check, and password hashing. Everything the service needs
//! (credential store, token codec) is injected at construction; there is no
//! global state and no server-side session table. Logout is purely a client
//! concern (discard the cookie) — an already-issued token stays decodable
//! until its natural expiry, which is an accepted limitation of the design.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwt::{Claims, TokenError, TokenService};
use crate::auth::models::{LoginOutcome, PublicUser};
use crate::database::store::CredentialStore;
use crate::error::ApiError;

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Verify credentials and mint a session. Unknown username and wrong
    /// password are deliberately indistinguishable in the result.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        // Fresh anti-forgery value per login, embedded in the token and
        // echoed to the caller for the header channel of the double-submit.
        let csrf = Uuid::new_v4().to_string();
        let token = self
            .tokens
            .issue(user.id, &user.username, &csrf)
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("failed to sign session token")))?;

        Ok(LoginOutcome {
            user: PublicUser::from(&user),
            token,
            csrf,
        })
    }

    /// Decode the presented session token, if any, into its claims.
    pub fn current_session(&self, token: Option<&str>) -> Result<Claims, ApiError> {
        let token = token.ok_or(ApiError::MissingToken)?;
        self.tokens.verify(token).map_err(|err| match err {
            TokenError::Expired => ApiError::Expired,
            TokenError::Malformed => ApiError::InvalidToken,
        })
    }
}

/// Hash a password with Argon2 and a fresh random salt (PHC string output).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("password hashing failed: {err}")))
}

/// Compare a submitted password against a stored PHC hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("corrupt password hash: {err}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::InvalidCredentials)
}
