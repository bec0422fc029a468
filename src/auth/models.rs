//! Authentication Models
//!
//! Request/response contracts for the login endpoints and the identity
//! attached to authenticated requests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::User;

/// Authenticated identity extracted from a verified session token and
/// injected into request extensions by the session guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The subset of a user record safe to return from login/session endpoints.
/// The password hash never leaves the store layer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
        }
    }
}

/// Everything a successful login produces: the identity view for the body,
/// the signed token for the cookie, and the anti-forgery value for the
/// `X-CSRF-Token` header.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: PublicUser,
    pub token: String,
    pub csrf: String,
}
