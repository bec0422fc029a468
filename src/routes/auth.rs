//! Login routes: session creation, session check, logout

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;

use crate::auth::middleware::{CSRF_HEADER, SESSION_COOKIE};
use crate::auth::models::{LoginRequest, PublicUser};
use crate::database::store::CredentialStore;
use crate::error::ApiError;
use crate::server::AppState;

/// POST /api/login
///
/// Verifies credentials and establishes a session. The token travels back as
/// an HttpOnly cookie the page script cannot read; the anti-forgery value
/// travels in the `X-CSRF-Token` header so the script can attach it to
/// later mutating requests.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth.login(&payload.username, &payload.password).await?;
    tracing::info!("user {} logged in", outcome.user.username);

    let cookie = Cookie::build((SESSION_COOKIE, outcome.token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();

    Ok((
        jar.add(cookie),
        [(CSRF_HEADER, outcome.csrf)],
        Json(outcome.user),
    ))
}

/// GET /api/login/me
///
/// Returns the identity behind the session cookie. Re-echoes the
/// anti-forgery value so a reloaded page can recover it without a fresh
/// login (the cookie alone is useless to the script).
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let claims = state.auth.current_session(token.as_deref())?;

    let user = state
        .db
        .find_by_id(claims.sub)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    Ok((
        [(CSRF_HEADER, claims.csrf)],
        Json(PublicUser::from(&user)),
    ))
}

/// POST /api/login/logout
///
/// Stateless: tells the browser to drop the cookie. The issued token stays
/// decodable until its natural expiry; there is no server-side revocation.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (
        jar.remove(cookie),
        Json(json!({ "message": "Logged out successfully" })),
    )
}
