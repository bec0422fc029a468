// # Routes Module
//
// - HTTP route handlers, organized by API domain.
// - Handlers are registered in `server.rs` using the Router.

use uuid::Uuid;

use crate::error::ApiError;

/// Login, session check, and logout endpoints
pub mod auth;

/// Health check endpoint
pub mod health;

/// Movie catalog endpoints
pub mod movies;

/// Registration and favorites/watchlist endpoints
pub mod users;

/// Parse a path id, mapping garbage to the API's "malformatted id" answer.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("malformatted id".to_string()))
}
