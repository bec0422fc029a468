//! Session guard
//!
//! Axum middleware gating protected routes. A request passes only when it
//! presents two independently-delivered values that agree: the session token
//! via the HttpOnly cookie, and the anti-forgery value via a request header.
//! A page that can trick the browser into sending the cookie cannot read it,
//! so it cannot also produce the matching header (double-submit pattern).
//!
//! The guard is stateless: verification is an in-process decode, no store
//! lookup, no shared mutable state between requests.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::auth::models::AuthUser;
use crate::auth::service::AuthService;
use crate::error::ApiError;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Header carrying the anti-forgery value on mutating requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Validate the session cookie and the anti-forgery header, then inject the
/// authenticated identity into request extensions.
pub async fn require_session(
    State(auth): State<Arc<AuthService>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let claims = auth.current_session(token.as_deref()).map_err(|err| {
        tracing::warn!("rejected {} {}: {}", req.method(), req.uri().path(), err);
        err
    })?;

    // The header must exactly equal the value embedded in the token. An
    // absent header fails the same way as a mismatched one.
    let header = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok());
    if header != Some(claims.csrf.as_str()) {
        tracing::warn!(
            "rejected {} {}: anti-forgery mismatch",
            req.method(),
            req.uri().path()
        );
        return Err(ApiError::InvalidToken);
    }

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        username: claims.username,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::auth::jwt::TokenService;
    use crate::auth::models::LoginOutcome;
    use crate::auth::service::{hash_password, AuthService};
    use crate::database::store::memory::MemoryStore;

    async fn echo_subject(Extension(user): Extension<AuthUser>) -> String {
        user.id.to_string()
    }

    fn guarded_router(auth: Arc<AuthService>) -> Router {
        Router::new()
            .route("/protected", get(echo_subject))
            .layer(middleware::from_fn_with_state(auth, require_session))
    }

    async fn logged_in(ttl_secs: i64) -> (Router, LoginOutcome) {
        let store = Arc::new(MemoryStore::new());
        let hash = hash_password("secret1").unwrap();
        store.insert("alice", None, &hash).await;
        let auth = Arc::new(AuthService::new(
            store,
            TokenService::new("test_secret", ttl_secs),
        ));
        let outcome = auth.login("alice", "secret1").await.unwrap();
        (guarded_router(auth), outcome)
    }

    async fn error_body(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        json["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn missing_cookie_is_rejected() {
        let (app, _) = logged_in(3600).await;
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(response).await, "missing token");
    }

    #[tokio::test]
    async fn missing_csrf_header_is_rejected() {
        let (app, outcome) = logged_in(3600).await;
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("cookie", format!("token={}", outcome.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(response).await, "invalid token");
    }

    #[tokio::test]
    async fn mismatched_csrf_header_is_rejected() {
        let (app, outcome) = logged_in(3600).await;
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("cookie", format!("token={}", outcome.token))
                    .header(CSRF_HEADER, "not-the-right-value")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(response).await, "invalid token");
    }

    #[tokio::test]
    async fn expired_token_is_rejected_with_expired_message() {
        let (app, outcome) = logged_in(-60).await;
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("cookie", format!("token={}", outcome.token))
                    .header(CSRF_HEADER, outcome.csrf.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(response).await, "token expired");
    }

    #[tokio::test]
    async fn valid_cookie_and_header_pass_through_with_subject() {
        let (app, outcome) = logged_in(3600).await;
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("cookie", format!("token={}", outcome.token))
                    .header(CSRF_HEADER, outcome.csrf.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes, outcome.user.id.to_string().as_bytes());
    }
}
