//! API error taxonomy
//!
//! Every failure a handler can produce maps onto one of these variants, and
//! each variant renders as a `{"error": "..."}` body with a fixed status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::database::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Login failed. Covers both unknown username and wrong password so the
    /// response cannot be used to enumerate accounts.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// A protected route was called without a session cookie.
    #[error("missing token")]
    MissingToken,

    /// Bad signature, malformed claims, or anti-forgery mismatch.
    #[error("invalid token")]
    InvalidToken,

    /// The token itself was fine but its embedded expiry has passed. Kept
    /// distinct from `InvalidToken` so clients can re-authenticate silently.
    #[error("token expired")]
    Expired,

    #[error("{0}")]
    Conflict(String),

    #[error("forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// Anything unanticipated. The cause is logged; the client only sees a
    /// generic message.
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::InvalidToken
            | ApiError::Expired => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            tracing::error!("internal error: {err:#}");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // The only unique constraint in the schema is the username.
            StoreError::Duplicate => ApiError::Conflict("username already exists".to_string()),
            StoreError::Backend(err) => ApiError::Internal(err),
        }
    }
}
